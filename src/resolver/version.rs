//! Toolchain version constraints as PubGrub ranges.
//!
//! Constraints use the syntax of the `compiler:` node of build
//! descriptions: comparators (`=`, `!=`, `>`, `>=`, `<`, `<=`, `~`, `~>`,
//! `^`), partial versions and wildcards (`6.x`, `6.18.*`, `*`), comma or
//! space separated conjunctions and `||` separated disjunctions. A bare
//! version is an exact match.

use std::fmt;

use pubgrub::Range;
use semver::Version;

/// A parsed version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    source: String,
    range: Range<Version>,
}

impl Constraint {
    /// Parse a constraint expression.
    pub fn parse(source: &str) -> Result<Self, String> {
        let source = source.trim();
        if source.is_empty() {
            return Err("empty constraint".to_string());
        }

        let mut range = Range::empty();
        for alternative in source.split("||") {
            let mut conjunction = Range::full();
            let comparators = tokenize(alternative)?;
            if comparators.is_empty() {
                return Err(format!("empty alternative in `{}`", source));
            }
            for comparator in comparators {
                conjunction = conjunction.intersection(&comparator_to_range(&comparator)?);
            }
            range = range.union(&conjunction);
        }

        Ok(Constraint {
            source: source.to_string(),
            range,
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.range.contains(version)
    }

    pub fn range(&self) -> &Range<Version> {
        &self.range
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split one alternative into comparators, joining an operator separated
/// from its version by whitespace (`>= 6.18`).
fn tokenize(alternative: &str) -> Result<Vec<String>, String> {
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_operator: Option<String> = None;

    for token in alternative
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
    {
        if token.chars().all(|c| "<>=!~^".contains(c)) {
            if pending_operator.is_some() {
                return Err(format!("operator `{}` without version", token));
            }
            pending_operator = Some(token.to_string());
            continue;
        }
        match pending_operator.take() {
            Some(operator) => comparators.push(format!("{}{}", operator, token)),
            None => comparators.push(token.to_string()),
        }
    }

    if let Some(operator) = pending_operator {
        return Err(format!("operator `{}` without version", operator));
    }
    Ok(comparators)
}

/// A possibly partial version: unspecified or wildcard parts are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
}

impl Partial {
    fn parse(text: &str) -> Result<Self, String> {
        let text = text.strip_prefix('v').unwrap_or(text);
        // Pre-release and build metadata do not take part in matching.
        let core = text.split(['-', '+']).next().unwrap_or(text);

        let mut parts = [None; 3];
        let mut wildcard = false;
        for (index, part) in core.split('.').enumerate() {
            if index >= 3 {
                return Err(format!("too many version components in `{}`", text));
            }
            if matches!(part, "x" | "X" | "*") {
                wildcard = true;
                continue;
            }
            if wildcard {
                return Err(format!("number after wildcard in `{}`", text));
            }
            let value = part
                .parse::<u64>()
                .map_err(|_| format!("invalid version `{}`", text))?;
            parts[index] = Some(value);
        }

        Ok(Partial {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
        })
    }

    /// Lowest version matching the partial.
    fn floor(&self) -> Version {
        Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        )
    }

    /// Lowest version above everything the partial matches.
    fn ceiling(&self) -> Result<Option<Version>, String> {
        Ok(match (self.major, self.minor, self.patch) {
            (None, _, _) => None,
            (Some(major), None, _) => Some(Version::new(next(major)?, 0, 0)),
            (Some(major), Some(minor), None) => Some(Version::new(major, next(minor)?, 0)),
            (Some(major), Some(minor), Some(patch)) => Some(Version::new(major, minor, next(patch)?)),
        })
    }

    /// Every version the partial stands for.
    fn span(&self) -> Result<Range<Version>, String> {
        Ok(match self.ceiling()? {
            Some(ceiling) => Range::between(self.floor(), ceiling),
            None => Range::full(),
        })
    }
}

/// Successor of a version component.
fn next(component: u64) -> Result<u64, String> {
    component
        .checked_add(1)
        .ok_or_else(|| format!("version component {} is too large", component))
}

fn comparator_to_range(comparator: &str) -> Result<Range<Version>, String> {
    let split = comparator
        .find(|c: char| !"<>=!~^".contains(c))
        .ok_or_else(|| format!("missing version in `{}`", comparator))?;
    let (operator, version) = comparator.split_at(split);
    let partial = Partial::parse(version)?;
    let floor = partial.floor();

    let range = match operator {
        "" | "=" | "==" => partial.span()?,
        "!=" => partial.span()?.complement(),
        ">" => match partial.ceiling()? {
            Some(ceiling) => Range::higher_than(ceiling),
            None => Range::empty(),
        },
        ">=" | "=>" => Range::higher_than(floor),
        "<" => Range::strictly_lower_than(floor),
        "<=" | "=<" => match partial.ceiling()? {
            Some(ceiling) => Range::strictly_lower_than(ceiling),
            None => Range::full(),
        },
        "~" | "~>" => {
            // ~1.2.3 and ~1.2 allow patch updates, ~1 minor updates
            let upper = match (partial.major, partial.minor) {
                (Some(major), Some(minor)) => Some(Version::new(major, next(minor)?, 0)),
                (Some(major), None) => Some(Version::new(next(major)?, 0, 0)),
                (None, _) => None,
            };
            match upper {
                Some(upper) => Range::between(floor, upper),
                None => Range::full(),
            }
        }
        "^" => {
            let upper = match (partial.major, partial.minor, partial.patch) {
                (None, _, _) => None,
                (Some(0), None, _) => Some(Version::new(1, 0, 0)),
                (Some(0), Some(0), None) => Some(Version::new(0, 1, 0)),
                (Some(0), Some(0), Some(patch)) => Some(Version::new(0, 0, next(patch)?)),
                (Some(0), Some(minor), _) => Some(Version::new(0, next(minor)?, 0)),
                (Some(major), _, _) => Some(Version::new(next(major)?, 0, 0)),
            };
            match upper {
                Some(upper) => Range::between(floor, upper),
                None => Range::full(),
            }
        }
        other => return Err(format!("unknown operator `{}`", other)),
    };

    Ok(range)
}
