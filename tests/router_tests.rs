use http::Method;
use switchyard::router::{compile_path, RouteRegistry};
use switchyard::Reply;

fn zoo_registry() -> RouteRegistry {
    let mut registry = RouteRegistry::new();
    registry.get("/", |_ctx| Ok("root".into()));
    registry.get("/zoo/animals", |_ctx| Ok("list".into()));
    registry.post("/zoo/animals", |_ctx| Ok(Reply::Status(201)));
    registry.get("/zoo/animals/:id", |_ctx| Ok("one".into()));
    registry.put("/zoo/animals/:id", |_ctx| Ok("update".into()));
    registry.patch("/zoo/animals/:id", |_ctx| Ok("patch".into()));
    registry.delete("/zoo/animals/:id", |_ctx| Ok(Reply::Status(204)));
    registry.get("/zoo/animals/:id/keepers/:keeper_id", |_ctx| Ok("keeper".into()));
    registry
}

fn first_match<'a>(
    registry: &'a RouteRegistry,
    method: &Method,
    path: &str,
) -> Option<(&'a str, Vec<(String, String)>)> {
    registry
        .routes_for(method)
        .iter()
        .find_map(|r| r.match_path(path).map(|p| (r.template.as_str(), p)))
}

#[test]
fn test_verbs_resolve_to_their_own_routes() {
    let registry = zoo_registry();
    let cases = [
        (Method::GET, "/", "/"),
        (Method::GET, "/zoo/animals", "/zoo/animals"),
        (Method::POST, "/zoo/animals", "/zoo/animals"),
        (Method::GET, "/zoo/animals/7", "/zoo/animals/:id"),
        (Method::PUT, "/zoo/animals/7", "/zoo/animals/:id"),
        (Method::PATCH, "/zoo/animals/7", "/zoo/animals/:id"),
        (Method::DELETE, "/zoo/animals/7", "/zoo/animals/:id"),
        (
            Method::GET,
            "/zoo/animals/7/keepers/3",
            "/zoo/animals/:id/keepers/:keeper_id",
        ),
    ];
    for (method, path, template) in cases {
        let (matched, _) = first_match(&registry, &method, path)
            .unwrap_or_else(|| panic!("{method} {path} did not match"));
        assert_eq!(matched, template, "{method} {path}");
    }
}

#[test]
fn test_unregistered_verb_and_path() {
    let registry = zoo_registry();
    assert!(first_match(&registry, &Method::POST, "/zoo/animals/7").is_none());
    assert!(first_match(&registry, &Method::GET, "/zoo/plants").is_none());
    assert!(first_match(&registry, &Method::HEAD, "/").is_none());
    assert!(registry.routes_for(&Method::OPTIONS).is_empty());
}

#[test]
fn test_multiple_params_are_named() {
    let registry = zoo_registry();
    let (_, params) = first_match(&registry, &Method::GET, "/zoo/animals/lion/keepers/k9").unwrap();
    assert_eq!(
        params,
        vec![
            ("id".to_string(), "lion".to_string()),
            ("keeper_id".to_string(), "k9".to_string()),
        ]
    );
}

#[test]
fn test_registration_order_decides_overlap() {
    let mut registry = RouteRegistry::new();
    registry.get("/items/:id", |_ctx| Ok("by id".into()));
    registry.get("/items/special", |_ctx| Ok("special".into()));

    let (template, params) = first_match(&registry, &Method::GET, "/items/special").unwrap();
    assert_eq!(template, "/items/:id");
    assert_eq!(params, vec![("id".to_string(), "special".to_string())]);
}

#[test]
fn test_compiled_pattern_is_anchored() {
    let (matcher, names) = compile_path("/quotes/:id");
    assert_eq!(names, vec!["id".to_string()]);
    assert!(matcher.is_match("/quotes/42"));
    assert!(!matcher.is_match("/api/quotes/42"));
    assert!(!matcher.is_match("/quotes/42/extra"));
    assert!(!matcher.is_match("/quotes/"));
}

#[test]
fn test_literal_segments_do_not_act_as_patterns() {
    let (matcher, names) = compile_path("/files/a.b/:name");
    assert!(names == vec!["name".to_string()]);
    assert!(matcher.is_match("/files/a.b/readme"));
    assert!(!matcher.is_match("/files/aXb/readme"));
}

#[test]
fn test_param_value_keeps_raw_segment() {
    let (matcher, _) = compile_path("/quotes/:id");
    assert_eq!(
        matcher.captures("/quotes/a%20b"),
        Some(vec!["a%20b".to_string()])
    );
}

#[test]
fn test_route_summaries_listing() {
    let registry = zoo_registry();
    let summaries = registry.route_summaries();
    assert_eq!(summaries.len(), registry.len());
    assert!(summaries.contains(&"DELETE /zoo/animals/:id".to_string()));
    let get_root = summaries.iter().position(|s| s == "GET /").unwrap();
    let get_id = summaries
        .iter()
        .position(|s| s == "GET /zoo/animals/:id")
        .unwrap();
    assert!(get_root < get_id);
}
