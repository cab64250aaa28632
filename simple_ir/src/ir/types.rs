//! Type lattice for the Sea-of-Nodes IR.
//!
//! Every node caches a [`Ty`], an interned handle into a [`TypeTable`]. Two
//! structurally equal types always share one handle, so type comparison is
//! an integer compare.
//!
//! The lattice runs from `Top` (nothing committed yet) down to `Bottom` (any
//! value at all):
//!
//! ```text
//!                 Top
//!               /     \
//!          IntTop      \
//!        /   |   \      Ctrl     [t0, t1, ..]  (componentwise)
//!     ..  Const(c)  ..  |
//!        \   |   /      |
//!          IntBot      /
//!               \     /
//!               Bottom
//! ```
//!
//! `meet` walks downwards: it is commutative, associative and idempotent,
//! `Top` is its identity and `Bottom` absorbs everything. A node's cached type
//! may only ever move downwards across recomputations.

use std::fmt;

use rustc_hash::FxHashMap;

use super::arena::{Arena, Id};

/// Interned handle to a lattice value.
pub type Ty = Id<Type>;

// =============================================================================
// Lattice Values
// =============================================================================

/// Integer sub-lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntType {
    /// Some integer, not yet known which.
    Top,
    /// Exactly this integer.
    Const(i64),
    /// Any integer.
    Bot,
}

impl IntType {
    /// Meet within the integer sub-lattice.
    #[inline]
    pub const fn meet(self, other: IntType) -> IntType {
        match (self, other) {
            (IntType::Top, x) | (x, IntType::Top) => x,
            (IntType::Const(a), IntType::Const(b)) if a == b => IntType::Const(a),
            _ => IntType::Bot,
        }
    }

    #[inline]
    pub const fn as_const(self) -> Option<i64> {
        match self {
            IntType::Const(v) => Some(v),
            _ => None,
        }
    }
}

/// A lattice value. Only ever observed through a [`Ty`] handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Most precise: no value committed.
    Top,
    /// Least precise: any value.
    Bottom,
    /// Control token produced by control nodes.
    Ctrl,
    /// Integer values.
    Int(IntType),
    /// Ordered components of a multi-valued node.
    Tuple(Box<[Ty]>),
}

// =============================================================================
// Type Table
// =============================================================================

/// Interning table for lattice values, owned by one compilation unit.
#[derive(Debug, Clone)]
pub struct TypeTable {
    types: Arena<Type>,
    interned: FxHashMap<Type, Ty>,
    top: Ty,
    bottom: Ty,
    ctrl: Ty,
    int_top: Ty,
    int_bot: Ty,
}

impl TypeTable {
    /// Create a table with the fixed lattice points pre-interned.
    pub fn new() -> Self {
        let mut table = TypeTable {
            types: Arena::with_capacity(64),
            interned: FxHashMap::default(),
            top: Id::new(0),
            bottom: Id::new(0),
            ctrl: Id::new(0),
            int_top: Id::new(0),
            int_bot: Id::new(0),
        };
        table.top = table.intern(Type::Top);
        table.bottom = table.intern(Type::Bottom);
        table.ctrl = table.intern(Type::Ctrl);
        table.int_top = table.intern(Type::Int(IntType::Top));
        table.int_bot = table.intern(Type::Int(IntType::Bot));
        table
    }

    /// Return the unique handle for `ty`, allocating it on first sight.
    pub fn intern(&mut self, ty: Type) -> Ty {
        if let Some(&id) = self.interned.get(&ty) {
            return id;
        }
        let id = self.types.alloc(ty.clone());
        self.interned.insert(ty, id);
        id
    }

    /// Look up the value behind a handle.
    #[inline]
    pub fn get(&self, ty: Ty) -> &Type {
        &self.types[ty]
    }

    /// Number of distinct types interned so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[inline]
    pub fn top(&self) -> Ty {
        self.top
    }

    #[inline]
    pub fn bottom(&self) -> Ty {
        self.bottom
    }

    #[inline]
    pub fn ctrl(&self) -> Ty {
        self.ctrl
    }

    #[inline]
    pub fn int_top(&self) -> Ty {
        self.int_top
    }

    #[inline]
    pub fn int_bot(&self) -> Ty {
        self.int_bot
    }

    /// The constant type of an integer literal.
    pub fn int(&mut self, value: i64) -> Ty {
        self.intern(Type::Int(IntType::Const(value)))
    }

    /// A tuple of component types.
    pub fn tuple(&mut self, components: Vec<Ty>) -> Ty {
        self.intern(Type::Tuple(components.into_boxed_slice()))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether `ty` denotes exactly one runtime value.
    pub fn is_constant(&self, ty: Ty) -> bool {
        matches!(self.get(ty), Type::Int(IntType::Const(_)))
    }

    /// The integer value of a constant type.
    pub fn as_int(&self, ty: Ty) -> Option<i64> {
        match self.get(ty) {
            Type::Int(int) => int.as_const(),
            _ => None,
        }
    }

    /// Project `ty` onto the integer sub-lattice.
    ///
    /// `Top` maps to `IntType::Top`; anything that is not an integer maps to
    /// `IntType::Bot`.
    pub fn as_int_type(&self, ty: Ty) -> IntType {
        match self.get(ty) {
            Type::Top => IntType::Top,
            Type::Int(int) => *int,
            _ => IntType::Bot,
        }
    }

    /// Arity of a tuple type, `None` for anything else.
    pub fn tuple_len(&self, ty: Ty) -> Option<usize> {
        match self.get(ty) {
            Type::Tuple(components) => Some(components.len()),
            _ => None,
        }
    }

    /// Component `index` of a tuple type.
    ///
    /// # Panics
    ///
    /// Panics if `ty` is not a tuple or `index` is out of range.
    pub fn at(&self, ty: Ty, index: usize) -> Ty {
        match self.get(ty) {
            Type::Tuple(components) => match components.get(index) {
                Some(&component) => component,
                None => panic!(
                    "tuple lane {} out of range for {} (arity {})",
                    index,
                    self.display(ty),
                    components.len()
                ),
            },
            _ => panic!("cannot project lane {} of non-tuple type {}", index, self.display(ty)),
        }
    }

    // =========================================================================
    // Lattice Operations
    // =========================================================================

    /// Greatest lower bound of two types.
    pub fn meet(&mut self, a: Ty, b: Ty) -> Ty {
        if a == b {
            return a;
        }
        match (self.get(a), self.get(b)) {
            (Type::Top, _) => b,
            (_, Type::Top) => a,
            (Type::Bottom, _) | (_, Type::Bottom) => self.bottom,
            (Type::Int(x), Type::Int(y)) => {
                let int = x.meet(*y);
                self.intern(Type::Int(int))
            }
            (Type::Tuple(xs), Type::Tuple(ys)) if xs.len() == ys.len() => {
                let pairs: Vec<(Ty, Ty)> = xs.iter().copied().zip(ys.iter().copied()).collect();
                let components = pairs.into_iter().map(|(x, y)| self.meet(x, y)).collect();
                self.tuple(components)
            }
            _ => self.bottom,
        }
    }

    /// Whether moving a node's type from `old` to `new` is allowed, i.e.
    /// `new` is at or below `old`.
    pub fn is_at_or_below(&mut self, old: Ty, new: Ty) -> bool {
        self.meet(old, new) == new
    }

    /// Render a type for diagnostics.
    pub fn display(&self, ty: Ty) -> TypeDisplay<'_> {
        TypeDisplay { table: self, ty }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Display adapter returned by [`TypeTable::display`].
pub struct TypeDisplay<'a> {
    table: &'a TypeTable,
    ty: Ty,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table.get(self.ty) {
            Type::Top => write!(f, "Top"),
            Type::Bottom => write!(f, "Bottom"),
            Type::Ctrl => write!(f, "Ctrl"),
            Type::Int(IntType::Top) => write!(f, "IntTop"),
            Type::Int(IntType::Bot) => write!(f, "IntBot"),
            Type::Int(IntType::Const(v)) => write!(f, "{}", v),
            Type::Tuple(components) => {
                write!(f, "[")?;
                for (i, &component) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.table.display(component))?;
                }
                write!(f, "]")
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
