use num_bigint::BigInt;
use num_rational::BigRational;

use crate::catalog::schema::Schema;
use crate::error::{DbError, Result};
use crate::parser::ast::{BinaryOperator, Expr, Literal};
use crate::tuple::value::Value;
use crate::tuple::Tuple;

/// What an expression evaluates to before comparison. Cells and literals
/// both collapse into this: INT and TIMESTAMP cells become integers,
/// STRING and DECIMAL cells become text, numeric literals keep their
/// unparsed form so they can be compared exactly against any numeric.
#[derive(Clone, Debug, PartialEq)]
enum Scalar {
    Int(i64),
    Text(String),
    Bool(bool),
    Number(String),
}

fn describe(scalar: &Scalar) -> &'static str {
    match scalar {
        Scalar::Int(_) | Scalar::Number(_) => "a number",
        Scalar::Text(_) => "a string",
        Scalar::Bool(_) => "a bool",
    }
}

/// Evaluates a predicate against one tuple. Anything that does not come
/// out as a boolean is a type mismatch.
pub fn evaluate(tuple: &Tuple, expr: &Expr, schema: &Schema) -> Result<bool> {
    match eval_expr(tuple, expr, schema)? {
        Scalar::Bool(val) => Ok(val),
        other => Err(DbError::type_mismatch_with_hint(
            format!("predicate must evaluate to BOOL, got {}", describe(&other)),
            "Use comparison operators (=, <, >) or logical operators (AND, OR) to return a boolean.",
        )),
    }
}

fn eval_expr(tuple: &Tuple, expr: &Expr, schema: &Schema) -> Result<Scalar> {
    match expr {
        Expr::Binary { left, op, right } => {
            let left = eval_expr(tuple, left, schema)?;
            let right = eval_expr(tuple, right, schema)?;
            compare(left, right, *op).map(Scalar::Bool)
        }
        Expr::Literal(literal) => Ok(match literal {
            Literal::Number(raw) => Scalar::Number(raw.clone()),
            Literal::String(val) => Scalar::Text(val.clone()),
            Literal::Boolean(val) => Scalar::Bool(*val),
        }),
        Expr::Identifier(name) => {
            let (idx, _) = schema
                .find_column(name)
                .ok_or_else(|| DbError::ColumnMissing(name.clone()))?;
            Ok(scalar_of(&tuple.values()[idx]))
        }
    }
}

fn scalar_of(value: &Value) -> Scalar {
    match value {
        Value::Int(val) | Value::Timestamp(val) => Scalar::Int(*val),
        Value::Str(val) | Value::Decimal(val) => Scalar::Text(val.clone()),
        Value::Bool(val) => Scalar::Bool(*val),
    }
}

fn is_numeric(scalar: &Scalar) -> bool {
    matches!(scalar, Scalar::Int(_) | Scalar::Number(_))
}

fn compare(left: Scalar, right: Scalar, op: BinaryOperator) -> Result<bool> {
    if is_numeric(&left) && is_numeric(&right) {
        let left = to_rational(&left)?;
        let right = to_rational(&right)?;
        return compare_rationals(&left, &right, op);
    }

    // mixed numeric/string, e.g. a DECIMAL cell against a numeric literal:
    // compare as rationals when both sides convert, fall through otherwise
    if is_numeric(&left) != is_numeric(&right) {
        if let (Ok(l), Ok(r)) = (to_rational(&left), to_rational(&right)) {
            return compare_rationals(&l, &r, op);
        }
    }

    match (&left, &right) {
        (Scalar::Text(l), Scalar::Text(r)) => match op {
            BinaryOperator::Eq => Ok(l == r),
            BinaryOperator::NotEq => Ok(l != r),
            BinaryOperator::Less => Ok(l < r),
            BinaryOperator::LessEq => Ok(l <= r),
            BinaryOperator::Greater => Ok(l > r),
            BinaryOperator::GreaterEq => Ok(l >= r),
            _ => Err(DbError::type_mismatch(format!(
                "invalid operator for string comparison: {}",
                op
            ))),
        },
        (Scalar::Bool(l), Scalar::Bool(r)) => match op {
            BinaryOperator::Eq => Ok(l == r),
            BinaryOperator::NotEq => Ok(l != r),
            BinaryOperator::And => Ok(*l && *r),
            BinaryOperator::Or => Ok(*l || *r),
            _ => Err(DbError::type_mismatch(format!(
                "invalid operator for boolean comparison: {}",
                op
            ))),
        },
        _ => Err(DbError::type_mismatch(format!(
            "unsupported comparison: {} {} {}",
            describe(&left),
            op,
            describe(&right)
        ))),
    }
}

fn compare_rationals(left: &BigRational, right: &BigRational, op: BinaryOperator) -> Result<bool> {
    match op {
        BinaryOperator::Eq => Ok(left == right),
        BinaryOperator::NotEq => Ok(left != right),
        BinaryOperator::Less => Ok(left < right),
        BinaryOperator::LessEq => Ok(left <= right),
        BinaryOperator::Greater => Ok(left > right),
        BinaryOperator::GreaterEq => Ok(left >= right),
        _ => Err(DbError::type_mismatch(format!(
            "invalid operator for numeric comparison: {}",
            op
        ))),
    }
}

fn to_rational(scalar: &Scalar) -> Result<BigRational> {
    match scalar {
        Scalar::Int(val) => Ok(BigRational::from_integer(BigInt::from(*val))),
        Scalar::Number(raw) | Scalar::Text(raw) => parse_rational(raw).ok_or_else(|| {
            DbError::type_mismatch(format!("invalid number format: {}", raw))
        }),
        Scalar::Bool(_) => Err(DbError::type_mismatch(
            "cannot convert a bool to a number".to_owned(),
        )),
    }
}

/// Parses decimal text ("42", "-10.50") into an exact rational.
fn parse_rational(text: &str) -> Option<BigRational> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    match text.split_once('.') {
        Some((whole, frac)) => {
            let digits: BigInt = format!("{}{}", whole, frac).parse().ok()?;
            let denominator: BigInt = format!("1{}", "0".repeat(frac.len())).parse().ok()?;
            Some(BigRational::new(digits, denominator))
        }
        None => {
            let val: BigInt = text.parse().ok()?;
            Some(BigRational::from_integer(val))
        }
    }
}

#[cfg(test)]
mod tests {
    use lazy_static::lazy_static;

    use super::evaluate;
    use crate::catalog::schema::{Column, ColumnType, Schema};
    use crate::error::DbError;
    use crate::parser::ast::{BinaryOperator, Expr, Literal};
    use crate::tuple::value::Value;
    use crate::tuple::Tuple;

    lazy_static! {
        static ref ACCOUNT_SCHEMA: Schema = Schema::new(vec![
            Column::new("id", ColumnType::Int),
            Column::new("name", ColumnType::String),
            Column::new("balance", ColumnType::Decimal),
            Column::new("active", ColumnType::Bool),
        ])
        .qualified("accounts");
    }

    fn account(id: i64, name: &str, balance: &str, active: bool) -> Tuple {
        Tuple::new(vec![
            Value::Int(id),
            Value::Str(name.to_owned()),
            Value::Decimal(balance.to_owned()),
            Value::Bool(active),
        ])
    }

    fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    fn column(name: &str) -> Expr {
        Expr::Identifier(name.to_owned())
    }

    fn number(raw: &str) -> Expr {
        Expr::Literal(Literal::Number(raw.to_owned()))
    }

    fn string(val: &str) -> Expr {
        Expr::Literal(Literal::String(val.to_owned()))
    }

    #[test]
    fn integer_cells_compare_against_numeric_literals() {
        let tuple = account(7, "alice", "10.50", true);

        let cases = [
            (BinaryOperator::Eq, "7", true),
            (BinaryOperator::NotEq, "7", false),
            (BinaryOperator::Less, "8", true),
            (BinaryOperator::LessEq, "7", true),
            (BinaryOperator::Greater, "7.5", false),
            (BinaryOperator::GreaterEq, "6.99", true),
        ];
        for (op, literal, expected) in cases {
            let expr = binary(column("id"), op, number(literal));
            assert_eq!(
                evaluate(&tuple, &expr, &ACCOUNT_SCHEMA).unwrap(),
                expected,
                "id {} {}",
                op,
                literal
            );
        }
    }

    #[test]
    fn decimal_cells_compare_exactly_against_raw_numbers() {
        let tuple = account(1, "alice", "10.50", true);

        let eq = binary(column("balance"), BinaryOperator::Eq, number("10.50"));
        assert!(evaluate(&tuple, &eq, &ACCOUNT_SCHEMA).unwrap());

        // trailing zeros do not matter to the rational comparison
        let eq_short = binary(column("balance"), BinaryOperator::Eq, number("10.5"));
        assert!(evaluate(&tuple, &eq_short, &ACCOUNT_SCHEMA).unwrap());

        let less = binary(column("balance"), BinaryOperator::Less, number("10.51"));
        assert!(evaluate(&tuple, &less, &ACCOUNT_SCHEMA).unwrap());
    }

    #[test]
    fn string_cells_compare_lexicographically() {
        let tuple = account(1, "bob", "0", true);

        let eq = binary(column("name"), BinaryOperator::Eq, string("bob"));
        assert!(evaluate(&tuple, &eq, &ACCOUNT_SCHEMA).unwrap());

        let less = binary(column("name"), BinaryOperator::Less, string("carol"));
        assert!(evaluate(&tuple, &less, &ACCOUNT_SCHEMA).unwrap());
    }

    #[test]
    fn numeric_strings_promote_to_numbers() {
        let tuple = account(1, "123", "0", true);
        let expr = binary(column("name"), BinaryOperator::Eq, number("123"));
        assert!(evaluate(&tuple, &expr, &ACCOUNT_SCHEMA).unwrap());
    }

    #[test]
    fn and_or_combine_comparisons() {
        let tuple = account(7, "alice", "10.50", true);

        let both = binary(
            binary(column("id"), BinaryOperator::Eq, number("7")),
            BinaryOperator::And,
            binary(column("balance"), BinaryOperator::Greater, number("10")),
        );
        assert!(evaluate(&tuple, &both, &ACCOUNT_SCHEMA).unwrap());

        let either = binary(
            binary(column("id"), BinaryOperator::Eq, number("8")),
            BinaryOperator::Or,
            binary(column("name"), BinaryOperator::Eq, string("alice")),
        );
        assert!(evaluate(&tuple, &either, &ACCOUNT_SCHEMA).unwrap());
    }

    #[test]
    fn qualified_identifiers_resolve_case_insensitively() {
        let tuple = account(7, "alice", "10.50", true);
        let expr = binary(column("Accounts.ID"), BinaryOperator::Eq, number("7"));
        assert!(evaluate(&tuple, &expr, &ACCOUNT_SCHEMA).unwrap());
    }

    #[test]
    fn missing_columns_are_reported() {
        let tuple = account(7, "alice", "10.50", true);
        let expr = binary(column("nope"), BinaryOperator::Eq, number("7"));
        let err = evaluate(&tuple, &expr, &ACCOUNT_SCHEMA).unwrap_err();
        assert!(matches!(err, DbError::ColumnMissing(_)));
    }

    #[test]
    fn non_boolean_predicates_are_type_mismatches() {
        let tuple = account(7, "alice", "10.50", true);
        let err = evaluate(&tuple, &column("name"), &ACCOUNT_SCHEMA).unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch { .. }));
    }

    #[test]
    fn mismatched_type_pairs_are_rejected() {
        let tuple = account(7, "alice", "10.50", true);

        // bool vs number has no comparison
        let expr = binary(column("active"), BinaryOperator::Eq, number("1"));
        let err = evaluate(&tuple, &expr, &ACCOUNT_SCHEMA).unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch { .. }));

        // AND over strings is invalid
        let expr = binary(column("name"), BinaryOperator::And, string("x"));
        let err = evaluate(&tuple, &expr, &ACCOUNT_SCHEMA).unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch { .. }));
    }

    #[test]
    fn bool_cells_support_equality_and_logic() {
        let tuple = account(7, "alice", "10.50", true);
        let expr = binary(
            column("active"),
            BinaryOperator::Eq,
            Expr::Literal(Literal::Boolean(true)),
        );
        assert!(evaluate(&tuple, &expr, &ACCOUNT_SCHEMA).unwrap());
    }
}
