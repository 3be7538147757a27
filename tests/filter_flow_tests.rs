//! End-to-end tests for the encode -> decode -> validate -> build flow

use serde_json::json;
use sift::prelude::*;

fn operators() -> OperatorRegistry {
    OperatorRegistry::default()
}

fn registry(operators: &OperatorRegistry) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            TypeConfig::new("F")
                .with_entity("Post")
                .with_operators(["equals", "contains"]),
            operators,
        )
        .unwrap();
    registry
}

fn schema() -> StaticSchema {
    StaticSchema::new()
        .entity(
            "Post",
            [
                ("title", FieldType::String),
                ("body", FieldType::Text),
                ("views", FieldType::Integer),
            ],
        )
        .entity("Author", [("name", FieldType::String)])
        .relation("Post", RelationKind::BelongsTo, "Author")
}

#[test]
fn test_worked_example() {
    let operators = operators();
    let registry = registry(&operators);
    let schema = schema();

    // Posted: one contains-filter on Post.title, current page is 2
    let posted = PostedFilters::from_json(&json!({
        "F": { "0": { "f": "Post.title", "o": "contains", "v": "cake" } }
    }));
    let url = encode(&posted, &NamedUrl::parse("/posts/page:2"), &registry);
    assert_eq!(url.to_string(), "/posts/Ff0:Post.title/Fo0:contains/Fv0:cake");

    // Decoding that URL restores the entry
    let set = decode(&url, &registry);
    let (valid, rejected) = validate(&set, &registry, &operators, &schema);
    assert!(rejected.is_empty());
    assert_eq!(valid.len(), 1);
    assert_eq!(valid[0].field, "Post.title");
    assert_eq!(valid[0].operator, "contains");
    assert_eq!(valid[0].value, "cake");

    // And the builder emits the LIKE condition with wildcards
    let output = build(&valid, &operators, "Post");
    let conditions = &output.conditions["Post"];
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].key, "Post.title LIKE");
    assert_eq!(conditions[0].value, "%cake%");
}

#[test]
fn test_round_trip_compaction() {
    let operators = operators();
    let registry = registry(&operators);

    // Entries at 0, 2 and 5: two holes
    let posted = PostedFilters::from_json(&json!({
        "F": {
            "0": { "f": "Post.title", "o": "contains", "v": "a" },
            "2": { "f": "Post.body",  "o": "contains", "v": "b" },
            "5": { "f": "Post.views", "o": "equals",   "v": "3" }
        }
    }));
    let url = encode(&posted, &NamedUrl::parse("/posts"), &registry);

    // Output indices are contiguous and order-preserving
    assert_eq!(url.get("Fv0"), Some("a"));
    assert_eq!(url.get("Fv1"), Some("b"));
    assert_eq!(url.get("Fv2"), Some("3"));
    assert!(url.get("Fv3").is_none());
    assert!(url.get("Fv5").is_none());
}

#[test]
fn test_encode_idempotence() {
    let operators = operators();
    let registry = registry(&operators);

    let posted = PostedFilters::from_json(&json!({
        "F": {
            "0": { "f": "Post.title", "o": "contains", "v": "a" },
            "1": { "f": "Post.body",  "o": "equals",   "v": "b" }
        }
    }));
    let first = encode(&posted, &NamedUrl::parse("/posts/page:3/sort:title"), &registry);
    let second = encode(&posted, &first, &registry);
    assert_eq!(first, second);
    assert_eq!(second.get("sort"), Some("title"));
}

#[test]
fn test_decode_no_cross_type_leak() {
    let operators = operators();
    let mut registry = TypeRegistry::new();
    registry
        .register(TypeConfig::new("Product"), &operators)
        .unwrap();
    registry
        .register(
            TypeConfig::new("Order").with_codes(ParamCodes::new("x", "y", "z")),
            &operators,
        )
        .unwrap();

    let url = NamedUrl::parse("/list/Productf0:p/Orderx0:o");
    let set = decode(&url, &registry);

    let product: Vec<_> = set.entries("Product").collect();
    assert_eq!(product.len(), 1);
    assert_eq!(product[0].1.field.as_deref(), Some("p"));

    let order: Vec<_> = set.entries("Order").collect();
    assert_eq!(order.len(), 1);
    assert_eq!(order[0].1.field.as_deref(), Some("o"));
}

#[test]
fn test_disallowed_operator_drops_without_panic() {
    let operators = operators();
    let registry = registry(&operators);
    let schema = schema();

    // greater_than exists in the catalog but F only allows equals/contains
    let url = NamedUrl::parse("/posts/Ff0:Post.views/Fo0:greater_than/Fv0:10");
    let set = decode(&url, &registry);
    let (valid, rejected) = validate(&set, &registry, &operators, &schema);
    assert!(valid.is_empty());
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].reason, DropReason::DisallowedOperator);
}

#[test]
fn test_unknown_operator_id_drops_without_panic() {
    let operators = operators();
    let registry = registry(&operators);
    let schema = schema();

    let url = NamedUrl::parse("/posts/Ff0:Post.title/Fo0:no_such_op/Fv0:x");
    let set = decode(&url, &registry);
    let (valid, rejected) = validate(&set, &registry, &operators, &schema);
    assert!(valid.is_empty());
    assert_eq!(rejected[0].reason, DropReason::DisallowedOperator);
}

#[test]
fn test_add_semantics() {
    let operators = operators();
    let registry = registry(&operators);

    // Two existing entries (max index 1) plus the ADD marker
    let posted = PostedFilters::from_json(&json!({
        "F": {
            "ADD": "1",
            "0": { "f": "Post.title", "o": "contains", "v": "a" },
            "1": { "f": "Post.body",  "o": "contains", "v": "b" }
        }
    }));
    let url = encode(&posted, &NamedUrl::parse("/posts"), &registry);
    assert_eq!(url.get("add_filter"), Some("F"));

    let set = decode(&url, &registry);
    assert_eq!(set.max_index("F"), Some(2));
    let blanks: Vec<_> = set
        .entries("F")
        .filter(|(_, raw)| raw.is_blank())
        .collect();
    assert_eq!(blanks.len(), 1);
    assert_eq!(blanks[0].0, 2);
}

#[test]
fn test_remove_semantics_via_rewrite() {
    let operators = operators();
    let registry = registry(&operators);

    let mut url = NamedUrl::parse(
        "/posts/Ff0:a/Fo0:equals/Fv0:1/Ff1:b/Fo1:equals/Fv1:2/Ff2:c/Fo2:equals/Fv2:3",
    );
    removal_rewrite(&registry, "F", 1, 2)
        .unwrap()
        .apply_to(&mut url);

    assert_eq!(url.get("Ff0"), Some("a"));
    assert_eq!(url.get("Ff1"), Some("c"));
    assert_eq!(url.get("Fo1"), Some("equals"));
    assert_eq!(url.get("Fv1"), Some("3"));
    assert!(url.get("Ff2").is_none());
    assert!(url.get("Fo2").is_none());
    assert!(url.get("Fv2").is_none());
}

#[test]
fn test_remove_semantics_via_post() {
    let operators = operators();
    let registry = registry(&operators);

    let posted = PostedFilters::from_json(&json!({
        "F": {
            "0": { "f": "Post.title", "o": "equals", "v": "1" },
            "1": { "f": "Post.body",  "o": "equals", "v": "2", "REMOVE": "1" },
            "2": { "f": "Post.views", "o": "equals", "v": "3" }
        }
    }));
    let url = encode(&posted, &NamedUrl::parse("/posts"), &registry);
    assert_eq!(url.get("Ff0"), Some("Post.title"));
    assert_eq!(url.get("Ff1"), Some("Post.views"));
    assert!(url.get("Ff2").is_none());
}

#[test]
fn test_addition_tokens_extend_url() {
    let operators = operators();
    let registry = registry(&operators);

    let mut url = NamedUrl::parse("/posts/Ff0:a/Fo0:equals/Fv0:1");
    let set = decode(&url, &registry);
    let next = set.max_index("F").map_or(0, |m| m + 1);
    for (key, value) in addition_tokens(&registry, "F", next).unwrap() {
        url.set(key, value);
    }

    assert_eq!(url.get("Ff1"), Some(""));
    assert_eq!(url.get("Fo1"), Some(""));
    assert_eq!(url.get("Fv1"), Some(""));
}

#[test]
fn test_equality_defaults_flow() {
    let operators = operators();
    let registry = registry(&operators);
    let schema = schema();

    let url = NamedUrl::parse(
        "/posts/Ff0:Post.title/Fo0:equals/Fv0:Hello/Ff1:Author.name/Fo1:equals/Fv1:bob",
    );
    let set = decode(&url, &registry);
    let (valid, _) = validate(&set, &registry, &operators, &schema);
    let output = build(&valid, &operators, "Post");

    // Only the primary-entity equality entry pre-fills the form
    assert_eq!(output.defaults.len(), 1);
    assert_eq!(output.defaults["title"], "Hello");
    assert_eq!(output.conditions["Author"][0].key, "Author.name");
}

#[test]
fn test_tampered_url_degrades_gracefully() {
    let operators = operators();
    let registry = registry(&operators);
    let schema = schema();

    // A mix of garbage, a foreign named param and one good filter
    let url = NamedUrl::parse(
        "/posts/page:9/Ffx:broken/Ff99:Post.nope/Fo99:equals/Fv99:x/sort:title/Ff0:Post.title/Fo0:contains/Fv0:ok",
    );
    let set = decode(&url, &registry);
    let (valid, rejected) = validate(&set, &registry, &operators, &schema);

    assert_eq!(valid.len(), 1);
    assert_eq!(valid[0].value, "ok");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].reason, DropReason::UnknownField);
}

#[derive(Clone, Default)]
struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLog {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLog {
    type Writer = CapturedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_dropped_entries_emit_debug_logs() {
    let operators = operators();
    let registry = registry(&operators);
    let schema = schema();

    let log = CapturedLog::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(log.clone())
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let url = NamedUrl::parse("/posts/Ff0:Post.nope/Fo0:equals/Fv0:x/add_filter:Nope");
        let set = decode(&url, &registry);
        let (valid, rejected) = validate(&set, &registry, &operators, &schema);
        assert!(valid.is_empty());
        assert_eq!(rejected.len(), 1);
    });

    let output = log.contents();
    assert!(output.contains("filter entry dropped"));
    assert!(output.contains("UnknownField"));
    assert!(output.contains("add directive for unregistered type ignored"));
}

#[test]
fn test_form_model_end_to_end() {
    let operators = operators();
    let registry = registry(&operators);
    let schema = schema();

    let model = FormModel::for_registry(&registry, &schema, &operators).unwrap();
    let f = &model.types["F"];

    // Related discovery: Post fields plus Author's through belongs-to
    let field_values: Vec<&str> = f.field_options.iter().map(|o| o.value.as_str()).collect();
    assert!(field_values.contains(&"Post.title"));
    assert!(field_values.contains(&"Author.name"));
    assert_eq!(f.operator_options.len(), 2);
    assert!(f.fixed_field.is_none());
    assert!(f.fixed_operator.is_none());
}
