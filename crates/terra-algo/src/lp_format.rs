//! Standard-format LP/MIP text emission (§4.5).
//!
//! A backend-agnostic in-memory model (variables, linear constraints,
//! bounds) plus a serializer to the textual LP format consumed by the
//! remote solver service. The same model also drives the in-process
//! solvers (`crate::solver`), so naming and coefficient handling live here
//! once.

const LINE_WRAP_WIDTH: usize = 200;
const MIN_COEFFICIENT_MAGNITUDE: f64 = 1e-10;
const MAX_COEFFICIENT_MAGNITUDE: f64 = 1e15;

/// One term in a linear expression: a coefficient on a named variable.
#[derive(Debug, Clone, Copy)]
pub struct Term<'a> {
    pub coefficient: f64,
    pub var: &'a str,
}

/// Relation of a constraint's left-hand side to its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

impl Relation {
    fn symbol(self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Le => "<=",
            Relation::Ge => ">=",
        }
    }
}

/// A single named linear constraint.
pub struct Constraint {
    pub name: String,
    pub terms: Vec<(f64, String)>,
    pub relation: Relation,
    pub rhs: f64,
}

/// Lower/upper bound for a continuous variable (binaries are declared
/// separately in the `Binary` section and need no bound entry).
pub struct Bound {
    pub var: String,
    pub lower: f64,
    pub upper: f64,
}

/// Backend-agnostic MIP model: one objective, a list of constraints, the
/// continuous variables' bounds, and the binary variable names.
#[derive(Default)]
pub struct LpModel {
    pub objective: Vec<(f64, String)>,
    pub constraints: Vec<Constraint>,
    pub bounds: Vec<Bound>,
    pub binaries: Vec<String>,
}

/// Issues raised while sanitizing coefficients, for the caller's diagnostics.
#[derive(Debug, Clone, Default)]
pub struct EmissionWarnings {
    pub non_finite_replaced: usize,
    pub clamped: usize,
    pub dropped_negligible: usize,
}

/// Sanitize one coefficient per §4.5: non-finite becomes 0 (and is
/// counted), magnitudes above 1e15 are clamped, magnitudes below 1e-10 are
/// left for the caller to drop from the term list entirely.
fn sanitize_coefficient(value: f64, warnings: &mut EmissionWarnings) -> f64 {
    if !value.is_finite() {
        warnings.non_finite_replaced += 1;
        return 0.0;
    }
    if value.abs() > MAX_COEFFICIENT_MAGNITUDE {
        warnings.clamped += 1;
        return MAX_COEFFICIENT_MAGNITUDE.copysign(value);
    }
    value
}

fn format_term(coefficient: f64, var: &str) -> String {
    if coefficient >= 0.0 {
        format!("+{} {}", format_number(coefficient), var)
    } else {
        format!("{} {}", format_number(coefficient), var)
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Wrap a sequence of already-formatted terms at `LINE_WRAP_WIDTH`,
/// joining wrapped lines with the LP format's bare continuation style
/// (each continuation line is just indented, no special marker needed).
fn wrap_terms(prefix: &str, terms: &[String]) -> String {
    let mut out = String::new();
    let mut line = String::from(prefix);
    for term in terms {
        if !line.is_empty() && line.len() + term.len() + 1 > LINE_WRAP_WIDTH {
            out.push_str(&line);
            out.push('\n');
            line = String::from("    ");
        }
        if !line.trim().is_empty() {
            line.push(' ');
        }
        line.push_str(term);
    }
    out.push_str(&line);
    out
}

/// Sanitize and filter a raw term list, dropping negligible coefficients.
fn sanitize_terms(raw: &[(f64, String)], warnings: &mut EmissionWarnings) -> Vec<(f64, String)> {
    raw.iter()
        .filter_map(|(coef, name)| {
            let sanitized = sanitize_coefficient(*coef, warnings);
            if sanitized.abs() < MIN_COEFFICIENT_MAGNITUDE {
                warnings.dropped_negligible += 1;
                None
            } else {
                Some((sanitized, name.clone()))
            }
        })
        .collect()
}

/// Serialize a model to the standard LP text format. Sections are always
/// emitted in order `Maximize`, `Subject To`, `Bounds`, `Binary`, `End`; an
/// empty objective gets a `+0 x0` placeholder rather than being omitted.
pub fn emit(model: &LpModel) -> (String, EmissionWarnings) {
    let mut warnings = EmissionWarnings::default();
    let mut out = String::new();

    out.push_str("Maximize\n");
    let objective_terms = sanitize_terms(&model.objective, &mut warnings);
    let formatted: Vec<String> = if objective_terms.is_empty() {
        vec!["+0 x0".to_string()]
    } else {
        objective_terms
            .iter()
            .map(|(c, v)| format_term(*c, v))
            .collect()
    };
    out.push_str(&wrap_terms(" obj:", &formatted));
    out.push('\n');

    out.push_str("Subject To\n");
    for constraint in &model.constraints {
        let terms = sanitize_terms(&constraint.terms, &mut warnings);
        let formatted: Vec<String> = terms.iter().map(|(c, v)| format_term(*c, v)).collect();
        let line = wrap_terms(&format!(" {}:", constraint.name), &formatted);
        out.push_str(&line);
        out.push(' ');
        out.push_str(constraint.relation.symbol());
        out.push(' ');
        out.push_str(&format_number(constraint.rhs));
        out.push('\n');
    }

    out.push_str("Bounds\n");
    for bound in &model.bounds {
        out.push_str(&format!(
            " {} <= {} <= {}\n",
            format_number(bound.lower),
            bound.var,
            format_number(bound.upper)
        ));
    }

    out.push_str("Binary\n");
    for var in &model.binaries {
        out.push_str(&format!(" {var}\n"));
    }

    out.push_str("End\n");

    (out, warnings)
}

/// Verify the emitted text carries all five required sections in order.
/// The builder MUST reject any emission missing one (§4.5).
pub fn validate_sections(text: &str) -> Result<(), String> {
    let required = ["Maximize", "Subject To", "Bounds", "Binary", "End"];
    let mut last_pos = 0usize;
    for section in required {
        match text[last_pos..].find(section) {
            Some(offset) => last_pos += offset + section.len(),
            None => return Err(format!("missing required section: {section}")),
        }
    }
    Ok(())
}
