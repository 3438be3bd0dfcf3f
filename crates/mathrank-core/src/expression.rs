//! Arithmetic expression generator.
//!
//! Each difficulty tier owns a family of construction rules ([`Category`]).
//! A single uniform draw picks the category, the category picks operands from
//! its ranges, and the resulting [`Formula`] is evaluated exactly. Display
//! text and value are both derived from that one formula, so they can never
//! disagree.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fraction::Fraction;

/// Difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Medium,
    Hard,
}

const MEDIUM_TABLE: &[(f64, Category)] = &[
    (0.30, Category::IntegerSum),
    (0.55, Category::SingleDigitProduct),
    (0.80, Category::ExactQuotient),
    (1.00, Category::SmallFractionSum),
];

const HARD_TABLE: &[(f64, Category)] = &[
    (0.25, Category::DecimalSum),
    (0.45, Category::TerminatingQuotient),
    (0.65, Category::DecimalProduct),
    (0.85, Category::MixedOps),
    (1.00, Category::FractionSum),
];

impl Difficulty {
    pub const ALL: [Difficulty; 2] = [Difficulty::Medium, Difficulty::Hard];

    /// Cumulative upper bounds for each category of this tier.
    ///
    /// The last bound is always `1.0`, so the table covers `[0, 1)` without gaps.
    pub fn category_table(self) -> &'static [(f64, Category)] {
        match self {
            Difficulty::Medium => MEDIUM_TABLE,
            Difficulty::Hard => HARD_TABLE,
        }
    }

    /// Map a uniform draw in `[0, 1)` to a category.
    pub fn pick_category(self, draw: f64) -> Category {
        let table = self.category_table();
        table
            .iter()
            .find(|(upper, _)| draw < *upper)
            .or_else(|| table.last())
            .map(|(_, category)| *category)
            .unwrap_or(Category::IntegerSum)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "medium" | "m" => Ok(Difficulty::Medium),
            "hard" | "h" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A leaf number in a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    Int(i64),
    /// A one-decimal-place number, stored in tenths.
    Tenths(i64),
}

impl Operand {
    /// A one-decimal-place number; whole values collapse to [`Operand::Int`].
    pub fn decimal(tenths: i64) -> Self {
        if tenths % 10 == 0 {
            Operand::Int(tenths / 10)
        } else {
            Operand::Tenths(tenths)
        }
    }

    pub fn value(self) -> Fraction {
        match self {
            Operand::Int(n) => Fraction::from_int(n),
            Operand::Tenths(t) => Fraction::from_tenths(t),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Operand::Int(n) => write!(f, "{n}"),
            Operand::Tenths(t) => {
                let sign = if t < 0 { "-" } else { "" };
                let abs = t.unsigned_abs();
                write!(f, "{sign}{}.{}", abs / 10, abs % 10)
            }
        }
    }
}

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub fn ascii(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }

    /// Typographic symbol shown to the player.
    pub fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '×',
            Op::Div => '÷',
        }
    }

    pub fn is_multiplicative(self) -> bool {
        matches!(self, Op::Mul | Op::Div)
    }

    pub fn apply(self, lhs: Fraction, rhs: Fraction) -> Option<Fraction> {
        match self {
            Op::Add => lhs.checked_add(rhs),
            Op::Sub => lhs.checked_sub(rhs),
            Op::Mul => lhs.checked_mul(rhs),
            Op::Div => lhs.checked_div(rhs),
        }
    }
}

/// A flat infix formula: `first (op operand)*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Formula {
    first: Operand,
    rest: Vec<(Op, Operand)>,
}

impl Formula {
    pub fn new(first: Operand) -> Self {
        Self {
            first,
            rest: Vec::new(),
        }
    }

    /// Append `op operand` to the right.
    pub fn then(mut self, op: Op, operand: Operand) -> Self {
        self.rest.push((op, operand));
        self
    }

    pub fn operands(&self) -> impl Iterator<Item = Operand> + '_ {
        std::iter::once(self.first).chain(self.rest.iter().map(|(_, o)| *o))
    }

    pub fn operators(&self) -> impl Iterator<Item = Op> + '_ {
        self.rest.iter().map(|(op, _)| *op)
    }

    /// Evaluate with `×`/`÷` binding tighter than `+`/`-`, left to right
    /// within each level. `None` on division by zero or overflow.
    pub fn evaluate(&self) -> Option<Fraction> {
        let mut total = Fraction::ZERO;
        let mut pending = Op::Add;
        let mut term = self.first.value();

        for &(op, operand) in &self.rest {
            if op.is_multiplicative() {
                term = op.apply(term, operand.value())?;
            } else {
                total = pending.apply(total, term)?;
                pending = op;
                term = operand.value();
            }
        }

        pending.apply(total, term)
    }

    /// Rendering with ASCII operators (`7*8-3`).
    pub fn ascii(&self) -> String {
        self.render(Op::ascii)
    }

    /// Rendering with typographic operators (`7×8-3`).
    pub fn display(&self) -> String {
        self.render(Op::symbol)
    }

    fn render(&self, symbol: fn(Op) -> char) -> String {
        let mut out = self.first.to_string();
        for &(op, operand) in &self.rest {
            out.push(symbol(op));
            out.push_str(&operand.to_string());
        }
        out
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// A construction family. Each tier draws from its own disjoint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    // Medium
    IntegerSum,
    SingleDigitProduct,
    ExactQuotient,
    SmallFractionSum,
    // Hard
    DecimalSum,
    TerminatingQuotient,
    DecimalProduct,
    MixedOps,
    FractionSum,
}

impl Category {
    pub fn difficulty(self) -> Difficulty {
        match self {
            Category::IntegerSum
            | Category::SingleDigitProduct
            | Category::ExactQuotient
            | Category::SmallFractionSum => Difficulty::Medium,
            Category::DecimalSum
            | Category::TerminatingQuotient
            | Category::DecimalProduct
            | Category::MixedOps
            | Category::FractionSum => Difficulty::Hard,
        }
    }

    /// Draw operands for this family and build the formula.
    pub fn construct<R: Rng + ?Sized>(self, rng: &mut R) -> Formula {
        use Operand::Int;

        match self {
            Category::IntegerSum => {
                let a = rng.gen_range(1..=20);
                let b = rng.gen_range(1..=10);
                Formula::new(Int(a)).then(add_or_sub(rng), Int(b))
            }
            Category::SingleDigitProduct => {
                let a = rng.gen_range(2..=9);
                let b = rng.gen_range(2..=9);
                Formula::new(Int(a)).then(Op::Mul, Int(b))
            }
            Category::ExactQuotient => {
                let a = rng.gen_range(2..=9);
                let b = rng.gen_range(2..=9);
                Formula::new(Int(a * b)).then(Op::Div, Int(a))
            }
            Category::SmallFractionSum => fraction_sum(rng, 1..=4, 2..=5),
            Category::DecimalSum => {
                let a = int_or_tenths(rng);
                let b = int_or_tenths(rng);
                Formula::new(a).then(add_or_sub(rng), b)
            }
            Category::TerminatingQuotient => {
                if rng.gen_bool(0.5) {
                    let divisor = rng.gen_range(2..=9);
                    let quotient = rng.gen_range(2..=15);
                    Formula::new(Int(divisor * quotient)).then(Op::Div, Int(divisor))
                } else {
                    // dividend / divisor lands exactly on a .5
                    let divisor = 2 * rng.gen_range(1..=4);
                    let dividend = divisor * rng.gen_range(1..=5) + divisor / 2;
                    Formula::new(Int(dividend)).then(Op::Div, Int(divisor))
                }
            }
            Category::DecimalProduct => {
                if rng.gen_bool(0.3) {
                    let a = Operand::decimal(rng.gen_range(0..=49));
                    let b = rng.gen_range(2..=5);
                    Formula::new(a).then(Op::Mul, Int(b))
                } else {
                    let a = rng.gen_range(3..=12);
                    let b = rng.gen_range(3..=9);
                    Formula::new(Int(a)).then(Op::Mul, Int(b))
                }
            }
            Category::MixedOps => {
                let a = rng.gen_range(1..=10);
                let b = rng.gen_range(1..=10);
                let c = rng.gen_range(1..=10);
                Formula::new(Int(a))
                    .then(Op::Mul, Int(b))
                    .then(add_or_sub(rng), Int(c))
            }
            Category::FractionSum => fraction_sum(rng, 1..=5, 2..=5),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::IntegerSum => "integer-sum",
            Category::SingleDigitProduct => "single-digit-product",
            Category::ExactQuotient => "exact-quotient",
            Category::SmallFractionSum => "small-fraction-sum",
            Category::DecimalSum => "decimal-sum",
            Category::TerminatingQuotient => "terminating-quotient",
            Category::DecimalProduct => "decimal-product",
            Category::MixedOps => "mixed-ops",
            Category::FractionSum => "fraction-sum",
        };
        f.write_str(name)
    }
}

fn add_or_sub<R: Rng + ?Sized>(rng: &mut R) -> Op {
    if rng.gen_bool(0.5) {
        Op::Add
    } else {
        Op::Sub
    }
}

fn int_or_tenths<R: Rng + ?Sized>(rng: &mut R) -> Operand {
    if rng.gen_bool(0.5) {
        Operand::Int(rng.gen_range(1..=15))
    } else {
        Operand::decimal(rng.gen_range(0..=99))
    }
}

fn fraction_sum<R: Rng + ?Sized>(
    rng: &mut R,
    numerators: std::ops::RangeInclusive<i64>,
    denominators: std::ops::RangeInclusive<i64>,
) -> Formula {
    let a = rng.gen_range(numerators.clone());
    let b = rng.gen_range(denominators.clone());
    let c = rng.gen_range(numerators);
    let d = rng.gen_range(denominators);
    Formula::new(Operand::Int(a))
        .then(Op::Div, Operand::Int(b))
        .then(add_or_sub(rng), Operand::Int(c))
        .then(Op::Div, Operand::Int(d))
}

/// One generated expression, before it is given an id.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub category: Category,
    pub formula: Formula,
    /// Typographic rendering shown to the player.
    pub display_text: String,
    /// Exact value, or `None` if the formula could not be evaluated.
    pub exact: Option<Fraction>,
    /// `exact` as a float; NaN when `exact` is `None`.
    pub value: f64,
}

impl Candidate {
    pub fn from_formula(category: Category, formula: Formula) -> Self {
        let exact = formula.evaluate();
        Self {
            category,
            display_text: formula.display(),
            value: exact.map(Fraction::to_f64).unwrap_or(f64::NAN),
            exact,
            formula,
        }
    }

    /// Finite and exactly evaluated.
    pub fn is_usable(&self) -> bool {
        self.exact.is_some() && self.value.is_finite()
    }
}

/// Generate one expression using the thread-local RNG.
pub fn generate(difficulty: Difficulty) -> Candidate {
    let mut rng = rand::thread_rng();
    generate_with(difficulty, &mut rng)
}

/// Generate one expression from the given RNG.
pub fn generate_with<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Candidate {
    let category = difficulty.pick_category(rng.gen::<f64>());
    let formula = category.construct(rng);
    Candidate::from_formula(category, formula)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Independent evaluator for an ASCII formula string.
    fn eval_ascii(text: &str) -> Fraction {
        let mut numbers = Vec::new();
        let mut ops = Vec::new();
        let mut current = String::new();
        for ch in text.chars() {
            if ch.is_ascii_digit() || ch == '.' {
                current.push(ch);
            } else {
                numbers.push(parse_number(&current));
                current.clear();
                ops.push(ch);
            }
        }
        numbers.push(parse_number(&current));

        // fold * and / into their left term first
        let mut terms = vec![numbers[0]];
        let mut signs = vec!['+'];
        for (op, n) in ops.into_iter().zip(numbers.into_iter().skip(1)) {
            match op {
                '*' => {
                    let last = terms.pop().unwrap();
                    terms.push(last.checked_mul(n).unwrap());
                }
                '/' => {
                    let last = terms.pop().unwrap();
                    terms.push(last.checked_div(n).unwrap());
                }
                '+' | '-' => {
                    terms.push(n);
                    signs.push(op);
                }
                other => panic!("unexpected operator {other}"),
            }
        }
        terms
            .into_iter()
            .zip(signs)
            .fold(Fraction::ZERO, |acc, (t, s)| {
                if s == '+' {
                    acc.checked_add(t).unwrap()
                } else {
                    acc.checked_sub(t).unwrap()
                }
            })
    }

    fn parse_number(s: &str) -> Fraction {
        match s.split_once('.') {
            Some((whole, tenth)) => {
                assert_eq!(tenth.len(), 1, "more than one decimal place in {s}");
                Fraction::from_tenths(whole.parse::<i64>().unwrap() * 10 + tenth.parse::<i64>().unwrap())
            }
            None => Fraction::from_int(s.parse().unwrap()),
        }
    }

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Medium.to_string(), "medium");
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("m".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("easy".parse::<Difficulty>().is_err());
    }

    #[test]
    fn category_tables_partition_unit_interval() {
        for difficulty in Difficulty::ALL {
            let table = difficulty.category_table();
            assert_eq!(table.last().unwrap().0, 1.0);
            assert!(table.windows(2).all(|w| w[0].0 < w[1].0));
            assert!(table.iter().all(|(_, c)| c.difficulty() == difficulty));
        }
    }

    #[test]
    fn pick_category_boundaries() {
        assert_eq!(Difficulty::Medium.pick_category(0.0), Category::IntegerSum);
        assert_eq!(Difficulty::Medium.pick_category(0.2999), Category::IntegerSum);
        assert_eq!(Difficulty::Medium.pick_category(0.30), Category::SingleDigitProduct);
        assert_eq!(Difficulty::Medium.pick_category(0.79), Category::ExactQuotient);
        assert_eq!(Difficulty::Medium.pick_category(0.9999), Category::SmallFractionSum);
        assert_eq!(Difficulty::Hard.pick_category(0.25), Category::TerminatingQuotient);
        assert_eq!(Difficulty::Hard.pick_category(0.84), Category::MixedOps);
        assert_eq!(Difficulty::Hard.pick_category(0.85), Category::FractionSum);
    }

    #[test]
    fn operand_rendering() {
        assert_eq!(Operand::decimal(25).to_string(), "2.5");
        assert_eq!(Operand::decimal(30), Operand::Int(3));
        assert_eq!(Operand::decimal(7).to_string(), "0.7");
        assert_eq!(Operand::decimal(0).to_string(), "0");
        assert_eq!(Operand::Tenths(-15).to_string(), "-1.5");
    }

    #[test]
    fn formula_respects_precedence() {
        // 2*3+4 = 10, 2+3*4 = 14
        let f = Formula::new(Operand::Int(2))
            .then(Op::Mul, Operand::Int(3))
            .then(Op::Add, Operand::Int(4));
        assert_eq!(f.evaluate(), Some(Fraction::from_int(10)));
        let g = Formula::new(Operand::Int(2))
            .then(Op::Add, Operand::Int(3))
            .then(Op::Mul, Operand::Int(4));
        assert_eq!(g.evaluate(), Some(Fraction::from_int(14)));
    }

    #[test]
    fn formula_left_to_right_within_level() {
        // 10-4-3 = 3, 24/4/2 = 3
        let f = Formula::new(Operand::Int(10))
            .then(Op::Sub, Operand::Int(4))
            .then(Op::Sub, Operand::Int(3));
        assert_eq!(f.evaluate(), Some(Fraction::from_int(3)));
        let g = Formula::new(Operand::Int(24))
            .then(Op::Div, Operand::Int(4))
            .then(Op::Div, Operand::Int(2));
        assert_eq!(g.evaluate(), Some(Fraction::from_int(3)));
    }

    #[test]
    fn fraction_formula_is_exact() {
        // 1/2-2/3 = -1/6
        let f = Formula::new(Operand::Int(1))
            .then(Op::Div, Operand::Int(2))
            .then(Op::Sub, Operand::Int(2))
            .then(Op::Div, Operand::Int(3));
        assert_eq!(f.evaluate(), Fraction::new(-1, 6));
        assert_eq!(f.display(), "1÷2-2÷3");
        assert_eq!(f.ascii(), "1/2-2/3");
    }

    #[test]
    fn division_by_zero_yields_unusable_candidate() {
        let f = Formula::new(Operand::Int(3)).then(Op::Div, Operand::Int(0));
        let c = Candidate::from_formula(Category::ExactQuotient, f);
        assert!(c.exact.is_none());
        assert!(c.value.is_nan());
        assert!(!c.is_usable());
    }

    #[test]
    fn display_text_evaluates_to_value() {
        let mut rng = StdRng::seed_from_u64(7);
        for difficulty in Difficulty::ALL {
            for _ in 0..10_000 {
                let c = generate_with(difficulty, &mut rng);
                assert!(c.is_usable(), "unusable candidate {}", c.display_text);
                let ascii = c.display_text.replace('×', "*").replace('÷', "/");
                assert_eq!(ascii, c.formula.ascii());
                let expected = eval_ascii(&ascii);
                assert_eq!(c.exact, Some(expected), "{}", c.display_text);
                assert_eq!(c.value, expected.to_f64(), "{}", c.display_text);
                assert_eq!(c.category.difficulty(), difficulty);
            }
        }
    }

    #[test]
    fn quotients_are_exact() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2_000 {
            let f = Category::ExactQuotient.construct(&mut rng);
            assert!(f.evaluate().unwrap().is_integer(), "{f}");

            let f = Category::TerminatingQuotient.construct(&mut rng);
            let v = f.evaluate().unwrap();
            assert!(v.denom() == 1 || v.denom() == 2, "{f} = {v}");
        }
    }

    #[test]
    fn decimal_operands_have_one_place() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..2_000 {
            for category in [Category::DecimalSum, Category::DecimalProduct] {
                let f = category.construct(&mut rng);
                for operand in f.operands() {
                    if let Operand::Tenths(t) = operand {
                        assert_ne!(t % 10, 0, "whole tenths should render as int in {f}");
                    }
                }
            }
        }
    }

    #[test]
    fn mixed_ops_multiplies_first() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let f = Category::MixedOps.construct(&mut rng);
            let ops: Vec<Op> = f.operators().collect();
            assert_eq!(ops.len(), 2);
            assert_eq!(ops[0], Op::Mul);
            assert!(!ops[1].is_multiplicative());
        }
    }

    #[test]
    fn thread_rng_generate_is_usable() {
        for _ in 0..100 {
            assert!(generate(Difficulty::Hard).is_usable());
        }
    }
}
