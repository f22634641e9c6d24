use super::version::{split_numeric_head, Version};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid version range '{expression}': {reason}")]
pub struct RangeParseError {
    pub expression: String,
    pub reason: String,
}

/// Outcome of checking a concrete version against a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEvaluation {
    Matches,
    NoMatch,
    /// The target version could not be parsed and the range is conditional
    VersionUnknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparator {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Constraint {
    Compare(Comparator, Version),
    /// `==1.2.*` (or `!=1.2.*` when `negated`)
    Prefix { parts: Vec<u64>, negated: bool },
}

impl Constraint {
    fn is_satisfied_by(&self, version: &Version) -> bool {
        match self {
            Constraint::Compare(op, bound) => match op {
                Comparator::Gt => version > bound,
                Comparator::Ge => version >= bound,
                Comparator::Lt => version < bound,
                Comparator::Le => version <= bound,
                Comparator::Eq => version == bound,
                Comparator::Ne => version != bound,
            },
            Constraint::Prefix { parts, negated } => {
                let actual = [version.major, version.minor, version.patch];
                let matched = parts.iter().zip(actual.iter()).all(|(want, got)| want == got);
                matched != *negated
            }
        }
    }
}

/// A parsed version constraint expression.
///
/// Operators: `>= <= > < == = != ~ ~= ^`, a bare version means `==`.
/// Commas join clauses with logical AND. An empty expression or `*` matches
/// every version, including unparseable ones.
///
/// * `~X.Y.Z` → `>=X.Y.Z, <X.(Y+1).0` (same minor)
/// * `~X` → `>=X.0.0, <(X+1).0.0`
/// * `^X.Y.Z` → `>=X.Y.Z, <(X+1).0.0` (same major)
/// * `~=X.Y` → `>=X.Y, <(X+1).0`; `~=X.Y.Z` → `>=X.Y.Z, <X.(Y+1).0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    expression: String,
    constraints: Vec<Constraint>,
}

impl VersionRange {
    pub fn parse(expression: &str) -> Result<Self, RangeParseError> {
        let expression = expression.trim();
        let mut constraints = Vec::new();

        if !(expression.is_empty() || expression == "*") {
            for clause in expression.split(',') {
                let clause = clause.trim();
                if clause.is_empty() {
                    return Err(error(expression, "empty clause between commas"));
                }
                parse_clause(clause, &mut constraints)
                    .map_err(|reason| error(expression, &reason))?;
            }
        }

        Ok(Self {
            expression: expression.to_string(),
            constraints,
        })
    }

    /// Range that accepts every version
    pub fn any() -> Self {
        Self {
            expression: String::new(),
            constraints: Vec::new(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// True when the range places no constraint on the version
    pub fn is_unconditional(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.constraints.iter().all(|c| c.is_satisfied_by(version))
    }

    /// Checks a raw version string. Never fails: an unparseable version
    /// yields [`RangeEvaluation::VersionUnknown`] unless the range is
    /// unconditional.
    pub fn evaluate(&self, raw_version: &str) -> RangeEvaluation {
        if self.is_unconditional() {
            return RangeEvaluation::Matches;
        }
        match Version::parse(raw_version) {
            Some(version) if self.contains(&version) => RangeEvaluation::Matches,
            Some(_) => RangeEvaluation::NoMatch,
            None => RangeEvaluation::VersionUnknown,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expression.is_empty() {
            write!(f, "*")
        } else {
            write!(f, "{}", self.expression)
        }
    }
}

fn error(expression: &str, reason: &str) -> RangeParseError {
    RangeParseError {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
}

/// Operators in match order; two-character operators first
const OPERATORS: [&str; 10] = [">=", "<=", "==", "!=", "~=", ">", "<", "=", "~", "^"];

fn parse_clause(clause: &str, out: &mut Vec<Constraint>) -> Result<(), String> {
    let (op, operand) = OPERATORS
        .iter()
        .find_map(|op| clause.strip_prefix(op).map(|rest| (*op, rest.trim())))
        .unwrap_or(("==", clause));

    if operand.is_empty() {
        return Err(format!("operator '{}' is missing a version", op));
    }

    if let Some(prefix) = wildcard_prefix(operand) {
        return match op {
            "==" | "=" => {
                out.push(Constraint::Prefix {
                    parts: prefix?,
                    negated: false,
                });
                Ok(())
            }
            "!=" => {
                out.push(Constraint::Prefix {
                    parts: prefix?,
                    negated: true,
                });
                Ok(())
            }
            _ => Err(format!("wildcard not allowed with '{}'", op)),
        };
    }

    let (version, precision) = Version::parse_with_precision(operand)
        .ok_or_else(|| format!("'{}' is not a version", operand))?;

    match op {
        ">=" => out.push(Constraint::Compare(Comparator::Ge, version)),
        "<=" => out.push(Constraint::Compare(Comparator::Le, version)),
        ">" => out.push(Constraint::Compare(Comparator::Gt, version)),
        "<" => out.push(Constraint::Compare(Comparator::Lt, version)),
        "==" | "=" => out.push(Constraint::Compare(Comparator::Eq, version)),
        "!=" => out.push(Constraint::Compare(Comparator::Ne, version)),
        "~" => {
            let upper = if precision == 1 {
                next_major(&version)?
            } else {
                next_minor(&version)?
            };
            push_bounded(out, version, upper);
        }
        "~=" => {
            if precision < 2 {
                return Err("'~=' needs at least major.minor".to_string());
            }
            let upper = if precision == 2 {
                next_major(&version)?
            } else {
                next_minor(&version)?
            };
            push_bounded(out, version, upper);
        }
        "^" => {
            let upper = next_major(&version)?;
            push_bounded(out, version, upper);
        }
        _ => return Err(format!("unsupported operator '{}'", op)),
    }
    Ok(())
}

fn next_major(version: &Version) -> Result<Version, String> {
    version
        .major
        .checked_add(1)
        .map(|major| Version::new(major, 0, 0))
        .ok_or_else(|| format!("major version {} has no upper bound", version.major))
}

fn next_minor(version: &Version) -> Result<Version, String> {
    version
        .minor
        .checked_add(1)
        .map(|minor| Version::new(version.major, minor, 0))
        .ok_or_else(|| format!("minor version {} has no upper bound", version.minor))
}

fn push_bounded(out: &mut Vec<Constraint>, lower: Version, upper: Version) {
    out.push(Constraint::Compare(Comparator::Ge, lower));
    out.push(Constraint::Compare(Comparator::Lt, upper));
}

/// `Some(..)` when the operand ends in a `*`/`x` component (`1.2.*`, `1.x`)
fn wildcard_prefix(operand: &str) -> Option<Result<Vec<u64>, String>> {
    let head = operand
        .strip_suffix(".*")
        .or_else(|| operand.strip_suffix(".x"))
        .or_else(|| operand.strip_suffix(".X"))?;

    Some(match split_numeric_head(head) {
        Some((parts, "")) if parts.len() <= 3 => Ok(parts),
        _ => Err(format!("'{}' is not a valid wildcard version", operand)),
    })
}
