//! Operators, their spellings and their numeric semantics.
//!
//! Every accepted spelling maps to exactly one [`Operator`] through a fixed
//! table. Each operator belongs to one [`Shape`], which decides whether the
//! target's current value takes part in the result.

use std::fmt;

/// How an operator combines the target and the operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `target = operand`
    Assign,
    /// `target = target <op> operand`
    Compound,
    /// `target = f(operand)`; the prior target value is ignored.
    Unary,
}

/// Canonical operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operator {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Min,
    Max,
    Atan2,
    Abs,
    Acos,
    Acosh,
    Asin,
    Asinh,
    Atan,
    Atanh,
    Cbrt,
    Ceil,
    Cos,
    Cosh,
    Floor,
    Log,
    Round,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
}

/// Spelling table. Lookup is exact on the case-folded token.
const ALIASES: &[(&str, Operator)] = &[
    ("=", Operator::Set),
    ("set", Operator::Set),
    ("+", Operator::Add),
    ("+=", Operator::Add),
    ("add", Operator::Add),
    ("-", Operator::Sub),
    ("-=", Operator::Sub),
    ("sub", Operator::Sub),
    ("*", Operator::Mul),
    ("*=", Operator::Mul),
    ("mul", Operator::Mul),
    ("/", Operator::Div),
    ("/=", Operator::Div),
    ("div", Operator::Div),
    ("%", Operator::Mod),
    ("%=", Operator::Mod),
    ("mod", Operator::Mod),
    ("**", Operator::Pow),
    ("^", Operator::Pow),
    ("^=", Operator::Pow),
    ("pow", Operator::Pow),
    ("min", Operator::Min),
    ("max", Operator::Max),
    ("atan2", Operator::Atan2),
    ("abs", Operator::Abs),
    ("acos", Operator::Acos),
    ("acosh", Operator::Acosh),
    ("asin", Operator::Asin),
    ("asinh", Operator::Asinh),
    ("atan", Operator::Atan),
    ("atanh", Operator::Atanh),
    ("cbrt", Operator::Cbrt),
    ("ceil", Operator::Ceil),
    ("cil", Operator::Ceil),
    ("cos", Operator::Cos),
    ("cosh", Operator::Cosh),
    ("floor", Operator::Floor),
    ("flr", Operator::Floor),
    ("log", Operator::Log),
    ("round", Operator::Round),
    ("rnd", Operator::Round),
    ("sin", Operator::Sin),
    ("sinh", Operator::Sinh),
    ("sqrt", Operator::Sqrt),
    ("sqr", Operator::Sqrt),
    ("tan", Operator::Tan),
    ("tanh", Operator::Tanh),
];

impl Operator {
    /// Looks up a case-folded spelling.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pbx_engine::op::{Operator, Shape};
    ///
    /// assert_eq!(Operator::from_alias("+="), Some(Operator::Add));
    /// assert_eq!(Operator::from_alias("add"), Some(Operator::Add));
    /// assert_eq!(Operator::from_alias("sqrt").map(|o| o.shape()), Some(Shape::Unary));
    /// assert_eq!(Operator::from_alias("xor"), None);
    /// ```
    pub fn from_alias(token: &str) -> Option<Self> {
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == token)
            .map(|(_, op)| *op)
    }

    /// Every spelling accepted for this operator.
    pub fn aliases(self) -> impl Iterator<Item = &'static str> {
        ALIASES
            .iter()
            .filter(move |(_, op)| *op == self)
            .map(|(alias, _)| *alias)
    }

    /// Semantic shape of the operator.
    pub const fn shape(self) -> Shape {
        match self {
            Self::Set => Shape::Assign,
            Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div
            | Self::Mod
            | Self::Pow
            | Self::Min
            | Self::Max
            | Self::Atan2 => Shape::Compound,
            _ => Shape::Unary,
        }
    }

    /// Canonical spelling, used when listing compiled programs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Set => "=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "pow",
            Self::Min => "min",
            Self::Max => "max",
            Self::Atan2 => "atan2",
            Self::Abs => "abs",
            Self::Acos => "acos",
            Self::Acosh => "acosh",
            Self::Asin => "asin",
            Self::Asinh => "asinh",
            Self::Atan => "atan",
            Self::Atanh => "atanh",
            Self::Cbrt => "cbrt",
            Self::Ceil => "ceil",
            Self::Cos => "cos",
            Self::Cosh => "cosh",
            Self::Floor => "floor",
            Self::Log => "log",
            Self::Round => "round",
            Self::Sin => "sin",
            Self::Sinh => "sinh",
            Self::Sqrt => "sqrt",
            Self::Tan => "tan",
            Self::Tanh => "tanh",
        }
    }

    /// Computes the new target value.
    ///
    /// `target` is the current value of the target slot; unary and assign
    /// operators ignore it. Plain IEEE-754 arithmetic, no error path.
    #[inline(always)]
    pub fn eval(self, target: f64, operand: f64) -> f64 {
        match self {
            Self::Set => operand,
            Self::Add => target + operand,
            Self::Sub => target - operand,
            Self::Mul => target * operand,
            Self::Div => target / operand,
            Self::Mod => target % operand,
            Self::Pow => target.powf(operand),
            Self::Min => target.min(operand),
            Self::Max => target.max(operand),
            Self::Atan2 => target.atan2(operand),
            Self::Abs => operand.abs(),
            Self::Acos => operand.acos(),
            Self::Acosh => operand.acosh(),
            Self::Asin => operand.asin(),
            Self::Asinh => operand.asinh(),
            Self::Atan => operand.atan(),
            Self::Atanh => operand.atanh(),
            Self::Cbrt => operand.cbrt(),
            Self::Ceil => operand.ceil(),
            Self::Cos => operand.cos(),
            Self::Cosh => operand.cosh(),
            Self::Floor => operand.floor(),
            Self::Log => operand.ln(),
            Self::Round => operand.round(),
            Self::Sin => operand.sin(),
            Self::Sinh => operand.sinh(),
            Self::Sqrt => operand.sqrt(),
            Self::Tan => operand.tan(),
            Self::Tanh => operand.tanh(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_every_canonical_name_resolves_to_itself() {
        for (_, op) in ALIASES {
            assert_eq!(Operator::from_alias(op.name()), Some(*op));
        }
    }

    #[test]
    fn test_aliases_are_unique() {
        for (i, (a, _)) in ALIASES.iter().enumerate() {
            assert!(
                ALIASES[i + 1..].iter().all(|(b, _)| a != b),
                "duplicate alias {a}"
            );
        }
    }

    #[test]
    fn test_spellings_normalize() {
        for spelling in ["-", "-=", "sub"] {
            assert_eq!(Operator::from_alias(spelling), Some(Operator::Sub));
        }
        for spelling in ["**", "^", "^=", "pow"] {
            assert_eq!(Operator::from_alias(spelling), Some(Operator::Pow));
        }
        assert_eq!(Operator::Add.aliases().collect::<Vec<_>>(), ["+", "+=", "add"]);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(Operator::Set.shape(), Shape::Assign);
        assert_eq!(Operator::Atan2.shape(), Shape::Compound);
        assert_eq!(Operator::Min.shape(), Shape::Compound);
        assert_eq!(Operator::Log.shape(), Shape::Unary);
        assert_eq!(Operator::Abs.shape(), Shape::Unary);
    }

    #[test]
    fn test_compound_uses_target() {
        assert_eq!(Operator::Add.eval(0.25, 0.5), 0.75);
        assert_eq!(Operator::Sub.eval(1.0, 0.25), 0.75);
        assert_eq!(Operator::Mod.eval(5.5, 2.0), 1.5);
        assert_eq!(Operator::Mod.eval(-5.5, 2.0), -1.5);
        assert_eq!(Operator::Pow.eval(3.0, 2.0), 9.0);
        assert_eq!(Operator::Min.eval(3.0, 2.0), 2.0);
        assert_eq!(Operator::Max.eval(3.0, 2.0), 3.0);
        assert_relative_eq!(
            Operator::Atan2.eval(1.0, 1.0),
            std::f64::consts::FRAC_PI_4
        );
    }

    #[test]
    fn test_unary_ignores_target() {
        assert_eq!(Operator::Sqrt.eval(100.0, 4.0), 2.0);
        assert_eq!(Operator::Abs.eval(7.0, -3.0), 3.0);
        assert_eq!(Operator::Round.eval(0.0, 2.5), 3.0);
        assert_eq!(Operator::Round.eval(0.0, -2.5), -3.0);
        assert_eq!(Operator::Floor.eval(0.0, -0.5), -1.0);
        assert_relative_eq!(Operator::Log.eval(0.0, std::f64::consts::E), 1.0);
        assert_eq!(Operator::Set.eval(9.0, 1.0), 1.0);
    }

    #[test]
    fn test_ieee_specials_pass_through() {
        assert_eq!(Operator::Div.eval(1.0, 0.0), f64::INFINITY);
        assert_eq!(Operator::Div.eval(-1.0, 0.0), f64::NEG_INFINITY);
        assert!(Operator::Div.eval(0.0, 0.0).is_nan());
        assert!(Operator::Sqrt.eval(0.0, -1.0).is_nan());
        assert_eq!(Operator::Log.eval(0.0, 0.0), f64::NEG_INFINITY);
    }
}
