//! Plantillas declarativas de candidatos y su resolución contra el contexto.
//!
//! Una plantilla puede referenciar valores de stages anteriores (`ctx`,
//! `member`, `each`). Justo antes de ejecutar un stage se materializan en
//! `Candidate`s concretos; una referencia `each` abre un abanico de llamadas,
//! una por elemento del valor referenciado.
//!
//! En JSON un argumento es o bien una forma etiquetada (`{"ctx": "circuit"}`,
//! `{"tuple": [0, 1]}`, `{"each": {"stage": "names"}}`) o bien un literal
//! cualquiera (`2`, `"SLOS"`, `[1, 0]`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PipelineContext;
use crate::errors::ResolveError;
use crate::probe::{Accept, Access, Candidate};
use crate::value::{CallArgs, ProbeValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "ArgRepr")]
pub enum ArgTemplate {
    Lit(Value),
    /// Valor producido por un stage anterior.
    Ctx(String),
    /// Atributo de un valor anterior (la clase en vez de la instancia, ...).
    Member { stage: String, name: String },
    Tuple(Vec<ArgTemplate>),
    List(Vec<ArgTemplate>),
    /// Una llamada por elemento. Si es opcional y el stage falta, no aporta llamadas.
    Each {
        stage: String,
        #[serde(default)]
        optional: bool,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArgRepr {
    Tagged(TaggedArg),
    Literal(Value),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedArg {
    Lit(Value),
    Ctx(String),
    Member { stage: String, name: String },
    Tuple(Vec<ArgTemplate>),
    List(Vec<ArgTemplate>),
    Each {
        stage: String,
        #[serde(default)]
        optional: bool,
    },
}

impl From<ArgRepr> for ArgTemplate {
    fn from(repr: ArgRepr) -> Self {
        match repr {
            ArgRepr::Literal(v) => ArgTemplate::Lit(v),
            ArgRepr::Tagged(t) => match t {
                TaggedArg::Lit(v) => ArgTemplate::Lit(v),
                TaggedArg::Ctx(s) => ArgTemplate::Ctx(s),
                TaggedArg::Member { stage, name } => ArgTemplate::Member { stage, name },
                TaggedArg::Tuple(items) => ArgTemplate::Tuple(items),
                TaggedArg::List(items) => ArgTemplate::List(items),
                TaggedArg::Each { stage, optional } => ArgTemplate::Each { stage, optional },
            },
        }
    }
}

/// Nombre del contexto mencionado por una plantilla.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    /// Una referencia dura hace al stage (o grupo) dependiente de ese nombre.
    pub hard: bool,
}

impl ArgTemplate {
    pub fn ctx(stage: impl Into<String>) -> Self {
        ArgTemplate::Ctx(stage.into())
    }

    pub fn lit(value: Value) -> Self {
        ArgTemplate::Lit(value)
    }

    pub fn collect_references(&self, out: &mut Vec<Reference>) {
        match self {
            ArgTemplate::Lit(_) => {}
            ArgTemplate::Ctx(stage) | ArgTemplate::Member { stage, .. } => out.push(Reference { name: stage.clone(),
                                                                                                hard: true }),
            ArgTemplate::Each { stage, optional } => out.push(Reference { name: stage.clone(),
                                                                          hard: !optional }),
            ArgTemplate::Tuple(items) | ArgTemplate::List(items) => items.iter().for_each(|i| i.collect_references(out)),
        }
    }

    /// Expande la plantilla en sus valores posibles (uno salvo `each`).
    pub fn expand(&self, ctx: &PipelineContext, max_items: usize) -> Result<Vec<ProbeValue>, ResolveError> {
        match self {
            ArgTemplate::Lit(v) => Ok(vec![ProbeValue::Data(v.clone())]),
            ArgTemplate::Ctx(stage) => Ok(vec![lookup(ctx, stage)?.clone()]),
            ArgTemplate::Member { stage, name } => {
                let owner = lookup(ctx, stage)?.as_introspect();
                let value = owner.get_member(name).map_err(|fault| ResolveError::Member { stage: stage.clone(),
                                                                                         name: name.clone(),
                                                                                         fault })?;
                Ok(vec![value])
            }
            ArgTemplate::Each { stage, optional } => match ctx.get(stage) {
                None if *optional => Ok(Vec::new()),
                None => Err(ResolveError::Missing(stage.clone())),
                Some(v) => v.elements(max_items).ok_or_else(|| ResolveError::NotIterable { stage: stage.clone(),
                                                                                            type_name: v.type_name() }),
            },
            ArgTemplate::Tuple(items) => Ok(product(items, ctx, max_items)?.into_iter().map(ProbeValue::Tuple).collect()),
            ArgTemplate::List(items) => Ok(product(items, ctx, max_items)?.into_iter().map(ProbeValue::List).collect()),
        }
    }
}

fn lookup<'c>(ctx: &'c PipelineContext, stage: &str) -> Result<&'c ProbeValue, ResolveError> {
    ctx.get(stage).ok_or_else(|| ResolveError::Missing(stage.to_string()))
}

/// Producto cartesiano de las expansiones de cada elemento, en orden,
/// truncado a `max_items` combinaciones.
fn product(items: &[ArgTemplate], ctx: &PipelineContext, max_items: usize) -> Result<Vec<Vec<ProbeValue>>, ResolveError> {
    let mut acc: Vec<Vec<ProbeValue>> = vec![Vec::new()];
    for item in items {
        let options = item.expand(ctx, max_items)?;
        acc = acc.into_iter()
                 .flat_map(|prefix| {
                     options.iter().map(move |o| {
                                       let mut next = prefix.clone();
                                       next.push(o.clone());
                                       next
                                   })
                 })
                 .take(max_items)
                 .collect();
    }
    Ok(acc)
}

/// Una convención de llamada: posicionales + keywords.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallTemplate {
    #[serde(default)]
    pub args: Vec<ArgTemplate>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub kwargs: IndexMap<String, ArgTemplate>,
}

impl CallTemplate {
    pub fn new(args: Vec<ArgTemplate>) -> Self {
        Self { args,
               kwargs: IndexMap::new() }
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: ArgTemplate) -> Self {
        self.kwargs.insert(name.into(), value);
        self
    }

    pub fn collect_references(&self, out: &mut Vec<Reference>) {
        self.args.iter().chain(self.kwargs.values()).for_each(|a| a.collect_references(out));
    }

    /// Llamadas concretas que produce esta plantilla (varias si hay `each`),
    /// nunca más de `max_items` aunque se combinen varios `each`.
    pub fn expand(&self, ctx: &PipelineContext, max_items: usize) -> Result<Vec<CallArgs>, ResolveError> {
        let positional = product(&self.args, ctx, max_items)?;
        let mut keyword_sets: Vec<IndexMap<String, ProbeValue>> = vec![IndexMap::new()];
        for (name, template) in &self.kwargs {
            let options = template.expand(ctx, max_items)?;
            keyword_sets = keyword_sets.into_iter()
                                       .flat_map(|prefix| {
                                           options.iter().map(move |o| {
                                                             let mut next = prefix.clone();
                                                             next.insert(name.clone(), o.clone());
                                                             next
                                                         })
                                       })
                                       .take(max_items)
                                       .collect();
        }
        let calls = positional.iter()
                              .flat_map(|p| {
                                  keyword_sets.iter().map(move |k| CallArgs { positional: p.clone(),
                                                                              keyword: k.clone() })
                              })
                              .take(max_items)
                              .collect();
        Ok(calls)
    }
}

fn default_calls() -> Vec<CallTemplate> {
    vec![CallTemplate::default()]
}

/// Operación candidata con sus convenciones de llamada, sin resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTemplate {
    pub op: String,
    #[serde(default)]
    pub access: Access,
    /// Si falta, se usa la aceptación del stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<Accept>,
    #[serde(default = "default_calls")]
    pub calls: Vec<CallTemplate>,
}

impl CandidateTemplate {
    pub fn call(op: impl Into<String>, calls: Vec<CallTemplate>) -> Self {
        Self { op: op.into(),
               access: Access::Call,
               accept: None,
               calls }
    }

    pub fn read(op: impl Into<String>) -> Self {
        Self { op: op.into(),
               access: Access::Read,
               accept: None,
               calls: default_calls() }
    }

    pub fn collect_references(&self, out: &mut Vec<Reference>) {
        self.calls.iter().for_each(|c| c.collect_references(out));
    }

    pub fn resolve(&self, ctx: &PipelineContext, default_accept: Accept, max_items: usize) -> Result<Candidate, ResolveError> {
        let mut calls = Vec::new();
        for template in &self.calls {
            calls.extend(template.expand(ctx, max_items)?);
        }
        Ok(Candidate { operation: self.op.clone(),
                       access: self.access,
                       accept: self.accept.unwrap_or(default_accept),
                       calls })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literal_shorthand_and_tagged_forms_deserialize() {
        let call: CallTemplate = serde_json::from_value(json!({
            "args": [{"ctx": "bs"}, {"tuple": [0, 1]}, [1, 0], "SLOS"],
            "kwargs": {"wires": 1}
        })).unwrap();
        assert_eq!(call.args[0], ArgTemplate::Ctx("bs".into()));
        assert_eq!(call.args[1],
                   ArgTemplate::Tuple(vec![ArgTemplate::Lit(json!(0)), ArgTemplate::Lit(json!(1))]));
        assert_eq!(call.args[2], ArgTemplate::Lit(json!([1, 0])));
        assert_eq!(call.args[3], ArgTemplate::Lit(json!("SLOS")));
        assert_eq!(call.kwargs["wires"], ArgTemplate::Lit(json!(1)));
    }

    #[test]
    fn each_fans_out_and_optional_each_may_vanish() {
        let mut ctx = PipelineContext::new();
        ctx.insert("names", json!(["SLOS", "Naive"]).into()).unwrap();

        let fan = CallTemplate::new(vec![ArgTemplate::Each { stage: "names".into(),
                                                             optional: false }]).kwarg("shots", ArgTemplate::Lit(json!(8)));
        let calls = fan.expand(&ctx, 16).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].signature().to_string(), r#"("Naive", shots=8)"#);

        let gone = CallTemplate::new(vec![ArgTemplate::Each { stage: "absent".into(),
                                                              optional: true }]);
        assert!(gone.expand(&ctx, 16).unwrap().is_empty());

        let hard = CallTemplate::new(vec![ArgTemplate::ctx("absent")]);
        assert_eq!(hard.expand(&ctx, 16).unwrap_err(), ResolveError::Missing("absent".into()));
    }

    #[test]
    fn combined_each_stays_within_max_items() {
        let mut ctx = PipelineContext::new();
        ctx.insert("wires", json!([0, 1, 2]).into()).unwrap();
        let each = || ArgTemplate::Each { stage: "wires".into(),
                                          optional: false };

        let pair = CallTemplate::new(vec![each(), each()]);
        let calls = pair.expand(&ctx, 4).unwrap();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].signature().to_string(), "(0, 0)");
        assert_eq!(calls[3].signature().to_string(), "(1, 0)");
        assert_eq!(pair.expand(&ctx, 16).unwrap().len(), 9);

        let mixed = CallTemplate::new(vec![each()]).kwarg("shots", each());
        assert_eq!(mixed.expand(&ctx, 4).unwrap().len(), 4);

        let nested = ArgTemplate::Tuple(vec![each(), each()]);
        assert_eq!(nested.expand(&ctx, 5).unwrap().len(), 5);
    }

    #[test]
    fn references_distinguish_hard_and_optional() {
        let c = CandidateTemplate::call("get_backend",
                                        vec![CallTemplate::new(vec![ArgTemplate::Each { stage: "names".into(),
                                                                                        optional: true }]),
                                             CallTemplate::new(vec![ArgTemplate::Member { stage: "pv".into(),
                                                                                          name: "BS".into() }])]);
        let mut refs = Vec::new();
        c.collect_references(&mut refs);
        assert_eq!(refs,
                   vec![Reference { name: "names".into(),
                                    hard: false },
                        Reference { name: "pv".into(),
                                    hard: true }]);
    }
}
