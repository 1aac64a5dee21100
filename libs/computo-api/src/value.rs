use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::CallError;

/// Shared handle to a host table. Tables have reference semantics:
/// the same table may appear in several places, including inside itself.
pub type TableRef = Rc<RefCell<Table>>;

/// Signature of a native function exposed to the host.
pub type NativeFn = dyn Fn(&[DynamicValue]) -> Result<DynamicValue, CallError>;

/// Host dynamic value.
///
/// Conversion to JSON is defined for the closed set `Nil`, `Boolean`,
/// `Integer`, `Float`, `String` and `Table`. `Function` and `Userdata`
/// are host kinds with no JSON counterpart; converters reject them.
#[derive(Clone)]
pub enum DynamicValue {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// Length-prefixed, embedded NUL bytes are preserved.
    String(String),
    Table(TableRef),
    Function(Function),
    /// Opaque host handle.
    Userdata(Rc<dyn Any>),
}

impl DynamicValue {
    pub fn string(s: impl Into<String>) -> Self {
        DynamicValue::String(s.into())
    }

    /// Wrap an owned table into a fresh shared handle.
    pub fn table(table: Table) -> Self {
        DynamicValue::Table(Rc::new(RefCell::new(table)))
    }

    /// Build a sequence table with keys `1..=n`.
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator<Item = DynamicValue>,
    {
        DynamicValue::table(Table::from_sequence(items))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, DynamicValue::Nil)
    }

    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            DynamicValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DynamicValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            DynamicValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DynamicValue::Nil => "nil",
            DynamicValue::Boolean(_) => "boolean",
            DynamicValue::Integer(_) => "integer",
            DynamicValue::Float(_) => "float",
            DynamicValue::String(_) => "string",
            DynamicValue::Table(_) => "table",
            DynamicValue::Function(_) => "function",
            DynamicValue::Userdata(_) => "userdata",
        }
    }
}

thread_local! {
    static COMPARING: RefCell<Vec<(*const RefCell<Table>, *const RefCell<Table>)>> =
        const { RefCell::new(Vec::new()) };
    static PRINTING: RefCell<Vec<*const RefCell<Table>>> = const { RefCell::new(Vec::new()) };
}

/// Structural table equality. A pair already being compared further up
/// the stack counts as equal, so cyclic tables terminate.
fn tables_eq(a: &TableRef, b: &TableRef) -> bool {
    if Rc::ptr_eq(a, b) {
        return true;
    }
    let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
    if COMPARING.with(|stack| stack.borrow().contains(&pair)) {
        return true;
    }
    let (Ok(x), Ok(y)) = (a.try_borrow(), b.try_borrow()) else {
        return false;
    };
    COMPARING.with(|stack| stack.borrow_mut().push(pair));
    let equal = *x == *y;
    COMPARING.with(|stack| stack.borrow_mut().pop());
    equal
}

/// Integer and float are distinct: `1` and `1.0` compare unequal.
/// Tables compare by identity first, then by content.
impl PartialEq for DynamicValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DynamicValue::Nil, DynamicValue::Nil) => true,
            (DynamicValue::Boolean(a), DynamicValue::Boolean(b)) => a == b,
            (DynamicValue::Integer(a), DynamicValue::Integer(b)) => a == b,
            (DynamicValue::Float(a), DynamicValue::Float(b)) => a == b,
            (DynamicValue::String(a), DynamicValue::String(b)) => a == b,
            (DynamicValue::Table(a), DynamicValue::Table(b)) => tables_eq(a, b),
            (DynamicValue::Function(a), DynamicValue::Function(b)) => {
                Rc::ptr_eq(&a.func, &b.func)
            }
            (DynamicValue::Userdata(a), DynamicValue::Userdata(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicValue::Nil => write!(f, "nil"),
            DynamicValue::Boolean(b) => write!(f, "{b}"),
            DynamicValue::Integer(i) => write!(f, "{i}"),
            DynamicValue::Float(x) => write!(f, "{x:?}"),
            DynamicValue::String(s) => write!(f, "{s:?}"),
            // A table already being printed shows as `<cycle>`.
            DynamicValue::Table(t) => {
                let ptr = Rc::as_ptr(t);
                if PRINTING.with(|stack| stack.borrow().contains(&ptr)) {
                    return write!(f, "<cycle>");
                }
                let Ok(table) = t.try_borrow() else {
                    return write!(f, "<borrowed table>");
                };
                PRINTING.with(|stack| stack.borrow_mut().push(ptr));
                let result = fmt::Debug::fmt(&*table, f);
                PRINTING.with(|stack| stack.borrow_mut().pop());
                result
            }
            DynamicValue::Function(func) => fmt::Debug::fmt(func, f),
            DynamicValue::Userdata(_) => write!(f, "userdata"),
        }
    }
}

impl From<bool> for DynamicValue {
    fn from(b: bool) -> Self {
        DynamicValue::Boolean(b)
    }
}

impl From<i64> for DynamicValue {
    fn from(i: i64) -> Self {
        DynamicValue::Integer(i)
    }
}

impl From<i32> for DynamicValue {
    fn from(i: i32) -> Self {
        DynamicValue::Integer(i64::from(i))
    }
}

impl From<f64> for DynamicValue {
    fn from(x: f64) -> Self {
        DynamicValue::Float(x)
    }
}

impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        DynamicValue::String(s.to_owned())
    }
}

impl From<String> for DynamicValue {
    fn from(s: String) -> Self {
        DynamicValue::String(s)
    }
}

impl From<Table> for DynamicValue {
    fn from(t: Table) -> Self {
        DynamicValue::table(t)
    }
}

impl From<Function> for DynamicValue {
    fn from(func: Function) -> Self {
        DynamicValue::Function(func)
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Table key.
///
/// Only `Integer` and `String` keys can be rendered as JSON object keys.
/// Floats with an exact integral value are normalized to `Integer`, so
/// `t[2.0]` and `t[2]` address the same slot.
#[derive(Debug, Clone)]
pub enum Key {
    Integer(i64),
    String(String),
    Boolean(bool),
    Float(f64),
}

impl Key {
    /// Float key, normalized to `Integer` when the value is integral.
    pub fn float(x: f64) -> Self {
        const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
        if x.fract() == 0.0 && (-LIMIT..LIMIT).contains(&x) {
            Key::Integer(x as i64)
        } else {
            Key::Float(x)
        }
    }

    /// Key for a host value, or `None` if the value cannot index a table.
    pub fn from_value(value: &DynamicValue) -> Option<Self> {
        match value {
            DynamicValue::Integer(i) => Some(Key::Integer(*i)),
            DynamicValue::String(s) => Some(Key::String(s.clone())),
            DynamicValue::Boolean(b) => Some(Key::Boolean(*b)),
            DynamicValue::Float(x) if x.is_nan() => None,
            DynamicValue::Float(x) => Some(Key::float(*x)),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Key::Integer(_) => "integer",
            Key::String(_) => "string",
            Key::Boolean(_) => "boolean",
            Key::Float(_) => "float",
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Integer(a), Key::Integer(b)) => a == b,
            (Key::String(a), Key::String(b)) => a == b,
            (Key::Boolean(a), Key::Boolean(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Integer(i) => i.hash(state),
            Key::String(s) => s.hash(state),
            Key::Boolean(b) => b.hash(state),
            Key::Float(x) => x.to_bits().hash(state),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Integer(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Integer(i64::from(i))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Boolean(b)
    }
}

impl From<f64> for Key {
    fn from(x: f64) -> Self {
        Key::float(x)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Host aggregate, usable both as a sequence and as a map.
///
/// Entries iterate in insertion order. Assigning `Nil` removes the key,
/// so no stored value is ever `Nil`.
#[derive(Clone, Default, PartialEq)]
pub struct Table {
    entries: IndexMap<Key, DynamicValue>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Table with keys `1..=n` in item order. `Nil` items leave holes.
    pub fn from_sequence<I>(items: I) -> Self
    where
        I: IntoIterator<Item = DynamicValue>,
    {
        let mut table = Table::new();
        for (i, item) in (1i64..).zip(items) {
            table.set(i, item);
        }
        table
    }

    pub fn get(&self, key: &Key) -> Option<&DynamicValue> {
        self.entries.get(key)
    }

    pub fn get_index(&self, index: i64) -> Option<&DynamicValue> {
        self.entries.get(&Key::Integer(index))
    }

    /// Assign `key = value`, returning the previous value. `Nil` removes.
    pub fn set(&mut self, key: impl Into<Key>, value: DynamicValue) -> Option<DynamicValue> {
        let key = key.into();
        if value.is_nil() {
            self.entries.shift_remove(&key)
        } else {
            self.entries.insert(key, value)
        }
    }

    /// Host length operator.
    ///
    /// Returns a border: the largest positive integer key, or 0 when
    /// there is none. `t[n]` is non-nil and `t[n + 1]` is nil, but keys
    /// below `n` may still be missing.
    pub fn length(&self) -> i64 {
        self.entries
            .keys()
            .filter_map(|k| match k {
                Key::Integer(i) if *i > 0 => Some(*i),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Number of stored entries, regardless of key kind.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &DynamicValue)> {
        self.entries.iter()
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Into<Key>> FromIterator<(K, DynamicValue)> for Table {
    fn from_iter<I: IntoIterator<Item = (K, DynamicValue)>>(iter: I) -> Self {
        let mut table = Table::new();
        for (k, v) in iter {
            table.set(k, v);
        }
        table
    }
}

// ---------------------------------------------------------------------------
// Function
// ---------------------------------------------------------------------------

/// Native function value.
#[derive(Clone)]
pub struct Function {
    name: Rc<str>,
    func: Rc<NativeFn>,
}

impl Function {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&[DynamicValue]) -> Result<DynamicValue, CallError> + 'static,
    {
        Self {
            name: Rc::from(name),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[DynamicValue]) -> Result<DynamicValue, CallError> {
        (self.func)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function: {}", self.name)
    }
}
