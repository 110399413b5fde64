//! Bundled validators, handed to `FunctionBuilder::build` configurators.
//!
//! A validator has two halves. Its shape (types, literals, bounds, array
//! items, object fields) compiles to a JSON Schema checked by `jsonschema`,
//! and every violation becomes an [`Issue`] at its instance path. Refinements
//! and transforms are layered on top and only run once the shape is valid.
//!
//! ```ignore
//! use zfn::validators::Validators;
//!
//! let z = Validators;
//! let user = z.object([
//!     ("name", z.string().min_len(1)),
//!     ("age", z.number().int().min(0.0).optional()),
//! ]);
//! ```

use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, json};
use zfn_types::{Issue, MaybeAsync, PathSegment, SchemaError, Value};

use crate::schema::{Capabilities, ParseResult, Schema, SchemaRef};

type Checked = Result<Value, Vec<Issue>>;
type Outcome = MaybeAsync<Checked>;
type Path = Vec<PathSegment>;

type CheckFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type AsyncCheckFn = Arc<dyn Fn(Value) -> BoxFuture<'static, bool> + Send + Sync>;
type MapFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;
type AsyncMapFn = Arc<dyn Fn(Value) -> BoxFuture<'static, Value> + Send + Sync>;

/// Namespace of validator constructors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validators;

impl Validators {
    /// Accepts anything.
    pub fn any(&self) -> Validator {
        Validator::new(Kind::Shape(json!({})))
    }

    pub fn number(&self) -> Validator {
        Validator::new(Kind::Shape(json!({"type": "number"})))
    }

    pub fn string(&self) -> Validator {
        Validator::new(Kind::Shape(json!({"type": "string"})))
    }

    pub fn boolean(&self) -> Validator {
        Validator::new(Kind::Shape(json!({"type": "boolean"})))
    }

    /// Accepts exactly `value`.
    pub fn literal(&self, value: impl Into<Value>) -> Validator {
        let value: Value = value.into();
        Validator::new(Kind::Shape(json!({"const": value})))
    }

    /// Array whose every element satisfies `item`.
    pub fn array(&self, item: Validator) -> Validator {
        Validator::new(Kind::Array(item))
    }

    /// Object with the given fields. Keys not listed are stripped.
    pub fn object<I, K>(&self, fields: I) -> Validator
    where
        I: IntoIterator<Item = (K, Validator)>,
        K: Into<String>,
    {
        let fields = fields.into_iter().map(|(key, v)| (key.into(), v)).collect();
        Validator::new(Kind::Object(fields))
    }
}

enum Kind {
    /// A JSON Schema with nothing layered on top.
    Shape(Value),
    Array(Validator),
    Object(Vec<(String, Validator)>),
    Optional(Validator),
    /// An extra JSON Schema keyword on the inner shape.
    Bound {
        inner: Validator,
        keyword: &'static str,
        limit: Value,
    },
    Refine {
        inner: Validator,
        check: CheckFn,
        message: String,
    },
    RefineAsync {
        inner: Validator,
        check: AsyncCheckFn,
        message: String,
    },
    Transform {
        inner: Validator,
        map: MapFn,
    },
    TransformAsync {
        inner: Validator,
        map: AsyncMapFn,
    },
}

struct Node {
    kind: Kind,
    compiled: OnceLock<Result<jsonschema::Validator, String>>,
}

/// A composable validator. Cheap to clone.
#[derive(Clone)]
pub struct Validator {
    node: Arc<Node>,
}

impl Validator {
    fn new(kind: Kind) -> Self {
        Self {
            node: Arc::new(Node {
                kind,
                compiled: OnceLock::new(),
            }),
        }
    }

    fn bound(self, keyword: &'static str, limit: Value) -> Self {
        Validator::new(Kind::Bound {
            inner: self,
            keyword,
            limit,
        })
    }

    /// Also accept `null`, and a missing key when used as an object field.
    pub fn optional(self) -> Self {
        Validator::new(Kind::Optional(self))
    }

    /// Reject values for which `check` is false.
    pub fn refine<F>(self, check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Validator::new(Kind::Refine {
            inner: self,
            check: Arc::new(check),
            message: message.into(),
        })
    }

    /// Reject values for which the future returned by `check` resolves to
    /// false. A synchronous parse reaching this step suspends.
    pub fn refine_async<F, Fut>(self, check: F, message: impl Into<String>) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Validator::new(Kind::RefineAsync {
            inner: self,
            check: Arc::new(move |value| check(value).boxed()),
            message: message.into(),
        })
    }

    /// Replace a valid value with `map(value)`.
    pub fn transform<F>(self, map: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Validator::new(Kind::Transform {
            inner: self,
            map: Arc::new(map),
        })
    }

    /// Replace a valid value with the output of an async `map`. A synchronous
    /// parse reaching this step suspends.
    pub fn transform_async<F, Fut>(self, map: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        Validator::new(Kind::TransformAsync {
            inner: self,
            map: Arc::new(move |value| map(value).boxed()),
        })
    }

    /// Numbers only: must have no fractional part.
    pub fn int(self) -> Self {
        self.bound("multipleOf", json!(1))
    }

    /// Numbers only: inclusive lower bound.
    pub fn min(self, min: f64) -> Self {
        self.bound("minimum", json!(min))
    }

    /// Numbers only: inclusive upper bound.
    pub fn max(self, max: f64) -> Self {
        self.bound("maximum", json!(max))
    }

    /// Strings only: minimum length in characters.
    pub fn min_len(self, len: usize) -> Self {
        self.bound("minLength", json!(len))
    }

    /// Strings only: maximum length in characters.
    pub fn max_len(self, len: usize) -> Self {
        self.bound("maxLength", json!(len))
    }

    /// The JSON Schema an input value has to satisfy.
    ///
    /// Refinements and transforms do not show up here; bounds apply to the
    /// input, before any transform.
    pub fn json_schema(&self) -> Value {
        match &self.node.kind {
            Kind::Shape(schema) => schema.clone(),
            Kind::Array(item) => json!({"type": "array", "items": item.json_schema()}),
            Kind::Object(fields) => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|(key, field)| (key.clone(), field.json_schema()))
                    .collect();
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|(_, field)| !field.is_optional())
                    .map(|(key, _)| key.as_str())
                    .collect();
                json!({"type": "object", "properties": properties, "required": required})
            }
            Kind::Optional(inner) => json!({"anyOf": [inner.json_schema(), {"type": "null"}]}),
            Kind::Bound { inner, keyword, limit } => {
                let mut schema = inner.json_schema();
                if let Value::Object(map) = &mut schema {
                    map.insert((*keyword).to_string(), limit.clone());
                }
                schema
            }
            Kind::Refine { inner, .. }
            | Kind::RefineAsync { inner, .. }
            | Kind::Transform { inner, .. }
            | Kind::TransformAsync { inner, .. } => inner.json_schema(),
        }
    }

    fn is_optional(&self) -> bool {
        match &self.node.kind {
            Kind::Optional(_) => true,
            Kind::Bound { inner, .. }
            | Kind::Refine { inner, .. }
            | Kind::RefineAsync { inner, .. }
            | Kind::Transform { inner, .. }
            | Kind::TransformAsync { inner, .. } => inner.is_optional(),
            Kind::Shape(_) | Kind::Array(_) | Kind::Object(_) => false,
        }
    }

    fn compiled(&self) -> Result<&jsonschema::Validator, SchemaError> {
        self.node
            .compiled
            .get_or_init(|| {
                jsonschema::options()
                    .with_draft(jsonschema::Draft::Draft202012)
                    .build(&self.json_schema())
                    .map_err(|err| err.to_string())
            })
            .as_ref()
            .map_err(|reason| SchemaError::Message(format!("Invalid validator schema: {}", reason)))
    }

    /// Every shape violation in `value`, in the order `jsonschema` reports them.
    fn shape_issues(&self, value: &Value) -> Result<Vec<Issue>, SchemaError> {
        let validator = self.compiled()?;
        Ok(validator
            .iter_errors(value)
            .map(|err| {
                let path = instance_path(&err.instance_path.to_string(), value);
                Issue::new(err.to_string(), path)
            })
            .collect())
    }

    /// Run the layers over a value whose shape is already valid.
    fn apply(&self, value: Value, path: Path) -> Outcome {
        match &self.node.kind {
            Kind::Shape(_) => ready(value),
            Kind::Bound { inner, .. } => inner.apply(value, path),
            Kind::Optional(inner) => {
                if value.is_null() {
                    ready(Value::Null)
                } else {
                    inner.apply(value, path)
                }
            }
            Kind::Array(item) => match value {
                Value::Array(items) => {
                    let steps = items
                        .into_iter()
                        .enumerate()
                        .map(|(i, v)| item.apply(v, child(&path, i.into())));
                    MaybeAsync::join_all(steps).map(|results| collect(results).map(Value::Array))
                }
                other => ready(other),
            },
            Kind::Object(fields) => match value {
                Value::Object(mut map) => {
                    let steps: Vec<_> = fields
                        .iter()
                        .filter_map(|(key, field)| {
                            let present = map.remove(key)?;
                            let key = key.clone();
                            let step = field.apply(present, child(&path, key.as_str().into()));
                            Some(step.map(move |checked| checked.map(|v| (key, v))))
                        })
                        .collect();
                    MaybeAsync::join_all(steps)
                        .map(|results| collect(results).map(|entries| Value::Object(entries.into_iter().collect())))
                }
                other => ready(other),
            },
            Kind::Refine { inner, check, message } => {
                let check = check.clone();
                let message = message.clone();
                inner.apply(value, path.clone()).map(move |checked| {
                    checked.and_then(|v| {
                        if check(&v) {
                            Ok(v)
                        } else {
                            Err(vec![Issue::new(message, path)])
                        }
                    })
                })
            }
            Kind::RefineAsync { inner, check, message } => {
                let check = check.clone();
                let message = message.clone();
                inner.apply(value, path.clone()).then(move |checked| match checked {
                    Ok(v) => {
                        let verdict = check(v.clone());
                        MaybeAsync::pending(async move {
                            if verdict.await {
                                Ok(v)
                            } else {
                                Err(vec![Issue::new(message, path)])
                            }
                        })
                    }
                    Err(issues) => MaybeAsync::Ready(Err(issues)),
                })
            }
            Kind::Transform { inner, map } => {
                let map = map.clone();
                inner.apply(value, path).map(move |checked| checked.map(|v| map(v)))
            }
            Kind::TransformAsync { inner, map } => {
                let map = map.clone();
                inner.apply(value, path).then(move |checked| match checked {
                    Ok(v) => {
                        let mapped = map(v);
                        MaybeAsync::pending(async move { Ok(mapped.await) })
                    }
                    Err(issues) => MaybeAsync::Ready(Err(issues)),
                })
            }
        }
    }
}

impl Schema for Validator {
    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    fn parse(&self, value: Value) -> ParseResult {
        match self.shape_issues(&value) {
            Ok(issues) if issues.is_empty() => {}
            Ok(issues) => return MaybeAsync::Ready(Err(SchemaError::Issues(issues))),
            Err(err) => return MaybeAsync::Ready(Err(err)),
        }
        self.apply(value, Vec::new()).map(|checked| checked.map_err(SchemaError::Issues))
    }
}

impl From<Validator> for SchemaRef {
    fn from(validator: Validator) -> Self {
        Arc::new(validator)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator")
            .field(&format_args!("{}", self.json_schema()))
            .finish()
    }
}

fn ready(value: Value) -> Outcome {
    MaybeAsync::Ready(Ok(value))
}

fn child(path: &Path, segment: PathSegment) -> Path {
    let mut path = path.clone();
    path.push(segment);
    path
}

/// Turn a JSON pointer into path segments, reading array positions as
/// indexes by following the pointer through `root`.
fn instance_path(pointer: &str, root: &Value) -> Path {
    let mut segments = Vec::new();
    let mut current = Some(root);
    for raw in pointer.split('/').skip(1) {
        let token = raw.replace("~1", "/").replace("~0", "~");
        let segment = match (current, token.parse::<usize>()) {
            (Some(Value::Array(_)), Ok(index)) => PathSegment::from(index),
            _ => PathSegment::Key(token),
        };
        current = current.and_then(|value| match &segment {
            PathSegment::Index(i) => value.get(*i as usize),
            PathSegment::Key(key) => value.get(key.as_str()),
        });
        segments.push(segment);
    }
    segments
}

/// All values if every step passed, otherwise every issue, in order.
fn collect<T>(results: Vec<Result<T, Vec<Issue>>>) -> Result<Vec<T>, Vec<Issue>> {
    let mut values = Vec::with_capacity(results.len());
    let mut issues = Vec::new();
    for result in results {
        match result {
            Ok(v) => values.push(v),
            Err(found) => issues.extend(found),
        }
    }
    if issues.is_empty() { Ok(values) } else { Err(issues) }
}
