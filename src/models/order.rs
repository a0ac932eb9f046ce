//! Manufacturing order model.
//!
//! An order asks for `quantity` pieces of one piece type, each piece going
//! through the same ordered list of machining operations (OP1, OP2, ...).
//! Orders are supplied by the business-record layer and are immutable for
//! the duration of one optimization run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Machining operation code (`OP1`, `OP2`, ...).
///
/// Stored as its 1-based number; rendered as `OP<n>` at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationCode(u8);

impl OperationCode {
    /// First operation of a piece.
    pub const OP1: Self = Self(1);
    /// Second operation of a piece.
    pub const OP2: Self = Self(2);

    /// Creates a code from its 1-based number. Returns `None` for zero.
    pub fn new(number: u8) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    /// 1-based operation number.
    #[inline]
    pub fn number(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for OperationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OP{}", self.0)
    }
}

impl FromStr for OperationCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix("OP")
            .or_else(|| s.trim().strip_prefix("op"))
            .ok_or_else(|| format!("operation code '{s}' must look like OP<n>"))?;
        let number: u8 = digits
            .parse()
            .map_err(|_| format!("operation code '{s}' has no valid number"))?;
        Self::new(number).ok_or_else(|| format!("operation code '{s}' must be OP1 or later"))
    }
}

impl TryFrom<String> for OperationCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OperationCode> for String {
    fn from(code: OperationCode) -> Self {
        code.to_string()
    }
}

/// One machining operation of an order's routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation code; the routing must declare OP1, OP2, ... in order.
    pub code: OperationCode,
    /// Processing time for the whole order quantity (ms).
    #[serde(default)]
    pub duration_ms: i64,
    /// Explicit processing time per piece (ms). Overrides `duration_ms / quantity`.
    #[serde(default)]
    pub piece_duration_ms: Option<i64>,
    /// Tools that must sit in the magazine while this operation runs.
    #[serde(default)]
    pub tools: Vec<String>,
}

impl Operation {
    /// Creates an operation with no tools and no duration.
    pub fn new(code: OperationCode) -> Self {
        Self {
            code,
            duration_ms: 0,
            piece_duration_ms: None,
            tools: Vec::new(),
        }
    }

    /// Sets the processing time for the whole order quantity.
    pub fn with_duration(mut self, duration_ms: i64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Sets an explicit per-piece processing time.
    pub fn with_piece_duration(mut self, piece_duration_ms: i64) -> Self {
        self.piece_duration_ms = Some(piece_duration_ms);
        self
    }

    /// Adds a required tool.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.push(tool.into());
        self
    }

    /// Adds several required tools.
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    /// Processing time of one piece (ms) for an order of `quantity` pieces.
    pub fn unit_duration_ms(&self, quantity: u32) -> i64 {
        match self.piece_duration_ms {
            Some(ms) => ms,
            None if quantity == 0 => 0,
            None => self.duration_ms / i64::from(quantity),
        }
    }

    /// Number of distinct tools required.
    pub fn distinct_tool_count(&self) -> usize {
        let mut tools: Vec<&str> = self.tools.iter().map(String::as_str).collect();
        tools.sort_unstable();
        tools.dedup();
        tools.len()
    }
}

/// A manufacturing order.
///
/// # Time Representation
/// `due_date_ms` is an absolute instant on the caller's epoch, the same
/// epoch as the scenario horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier (e.g. `OF-00185`).
    pub id: String,
    /// Piece type reference.
    #[serde(default)]
    pub piece_type: String,
    /// Number of pieces to produce.
    pub quantity: u32,
    /// Routing: operations in execution order.
    pub operations: Vec<Operation>,
    /// Due date (absolute ms). `None` = no due date.
    #[serde(default)]
    pub due_date_ms: Option<i64>,
    /// Priority weight applied to tardiness (higher = more important).
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Fixture (montage/pallet) the pieces are clamped in. Blocks never mix fixtures.
    #[serde(default)]
    pub fixture: Option<String>,
    /// Machine loading time added to every piece operation (ms).
    #[serde(default)]
    pub load_ms: i64,
    /// Table rotation time added to every piece operation (ms).
    #[serde(default)]
    pub rotation_ms: i64,
}

fn default_priority() -> i32 {
    1
}

impl Order {
    /// Creates an order with the given ID and quantity.
    pub fn new(id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            piece_type: String::new(),
            quantity,
            operations: Vec::new(),
            due_date_ms: None,
            priority: default_priority(),
            fixture: None,
            load_ms: 0,
            rotation_ms: 0,
        }
    }

    /// Sets the piece type.
    pub fn with_piece_type(mut self, piece_type: impl Into<String>) -> Self {
        self.piece_type = piece_type.into();
        self
    }

    /// Appends an operation to the routing.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Sets the due date (absolute ms).
    pub fn with_due_date(mut self, due_date_ms: i64) -> Self {
        self.due_date_ms = Some(due_date_ms);
        self
    }

    /// Sets the priority weight.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the fixture.
    pub fn with_fixture(mut self, fixture: impl Into<String>) -> Self {
        self.fixture = Some(fixture.into());
        self
    }

    /// Sets the per-piece loading time.
    pub fn with_load_time(mut self, load_ms: i64) -> Self {
        self.load_ms = load_ms;
        self
    }

    /// Sets the per-piece table rotation time.
    pub fn with_rotation_time(mut self, rotation_ms: i64) -> Self {
        self.rotation_ms = rotation_ms;
        self
    }

    /// Processing time of one piece across all operations, loading and
    /// rotation included (ms).
    pub fn piece_duration_ms(&self) -> i64 {
        self.operations
            .iter()
            .map(|op| op.unit_duration_ms(self.quantity) + self.load_ms + self.rotation_ms)
            .sum()
    }

    /// Total processing time of the order (ms), setups excluded.
    pub fn total_duration_ms(&self) -> i64 {
        self.piece_duration_ms() * i64::from(self.quantity)
    }

    /// Number of atomic tasks this order expands into.
    pub fn task_count(&self) -> usize {
        self.quantity as usize * self.operations.len()
    }

    /// Sorted, deduplicated union of the tools of all operations.
    pub fn tool_signature(&self) -> Vec<&str> {
        let mut tools: Vec<&str> = self
            .operations
            .iter()
            .flat_map(|op| op.tools.iter().map(String::as_str))
            .collect();
        tools.sort_unstable();
        tools.dedup();
        tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_code_parse_and_display() {
        let code: OperationCode = "OP2".parse().unwrap();
        assert_eq!(code, OperationCode::OP2);
        assert_eq!(code.to_string(), "OP2");
        assert_eq!(code.number(), 2);

        assert!("OP0".parse::<OperationCode>().is_err());
        assert!("X1".parse::<OperationCode>().is_err());
        assert!(OperationCode::new(0).is_none());
    }

    #[test]
    fn test_operation_code_serde() {
        let json = serde_json::to_string(&OperationCode::OP1).unwrap();
        assert_eq!(json, "\"OP1\"");
        let back: OperationCode = serde_json::from_str("\"OP3\"").unwrap();
        assert_eq!(back.number(), 3);
        assert!(serde_json::from_str::<OperationCode>("\"OPX\"").is_err());
    }

    #[test]
    fn test_unit_duration() {
        let op = Operation::new(OperationCode::OP1).with_duration(1000);
        assert_eq!(op.unit_duration_ms(4), 250);
        assert_eq!(op.unit_duration_ms(0), 0);

        let explicit = op.with_piece_duration(300);
        assert_eq!(explicit.unit_duration_ms(4), 300);
    }

    #[test]
    fn test_order_builder_and_durations() {
        let order = Order::new("OF-001", 2)
            .with_piece_type("Bracket")
            .with_due_date(50_000)
            .with_priority(3)
            .with_fixture("M-50")
            .with_load_time(10)
            .with_operation(
                Operation::new(OperationCode::OP1)
                    .with_duration(200)
                    .with_tools(["T1", "T2"]),
            )
            .with_operation(
                Operation::new(OperationCode::OP2)
                    .with_duration(100)
                    .with_tool("T2")
                    .with_tool("T3"),
            );

        assert_eq!(order.piece_type, "Bracket");
        assert_eq!(order.due_date_ms, Some(50_000));
        assert_eq!(order.priority, 3);
        assert_eq!(order.fixture.as_deref(), Some("M-50"));
        // (100 + 10) + (50 + 10)
        assert_eq!(order.piece_duration_ms(), 170);
        assert_eq!(order.total_duration_ms(), 340);
        assert_eq!(order.task_count(), 4);
        assert_eq!(order.tool_signature(), vec!["T1", "T2", "T3"]);
    }

    #[test]
    fn test_order_deserialize_defaults() {
        let json = r#"{
            "id": "OF-7",
            "quantity": 3,
            "operations": [{ "code": "OP1", "duration_ms": 900, "tools": ["A", "A", "B"] }]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.priority, 1);
        assert_eq!(order.due_date_ms, None);
        assert_eq!(order.load_ms, 0);
        assert_eq!(order.operations[0].distinct_tool_count(), 2);
        assert_eq!(order.operations[0].unit_duration_ms(order.quantity), 300);
    }
}
