//! End-to-end tests for linked-dependency extraction and reinsertion.

use htmlgraft::deps::linked;
use htmlgraft::{ExtractConfig, GraftError, HtmlDocument, LinkedDeps, ResourceIds, dir_url_from_file};

#[test]
fn extracts_relative_and_absolute_script_references() {
    let html = r#"<html>
	<head>
		<script src="./app.js"></script>
		<script src="https://cdn.example.com/lib.js"></script>
	</head>
</html>"#;

    let config = ExtractConfig::default();
    let (stripped, deps) = linked::extract_html(html, "c:/path/to/index.html", &config).unwrap();

    assert_eq!(deps.scripts.len(), 2);
    assert_eq!(deps.scripts[0].id, "link://0");
    assert_eq!(deps.scripts[0].url.as_str(), "file:///c:/path/to/app.js");
    assert_eq!(deps.scripts[1].id, "link://1");
    assert_eq!(deps.scripts[1].url.as_str(), "https://cdn.example.com/lib.js");
    assert!(deps.styles.is_empty());
    assert!(deps.images.is_empty());
    assert!(deps.icons.is_empty());

    assert!(!stripped.contains("src="), "the original reference attribute must be stripped");
    assert!(stripped.contains(r#"res-link="link://0""#));
    assert!(stripped.contains(r#"res-link="link://1""#));
}

#[test]
fn extracts_icons_and_data_url_images_preserving_attributes() {
    let html = r#"<html>
	<head>
		<link rel="icon" width="128" style="background-color: red;" href="../assets/favicon.ico">
	</head>
	<body><div id="root">
		<img src="data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAA">
	</div></body>
</html>"#;

    let config = ExtractConfig::default();
    let (stripped, deps) = linked::extract_html(html, "z:/path/to/pages/index.html", &config).unwrap();

    // images are processed before icons, so the img takes the first id
    assert_eq!(deps.images.len(), 1);
    assert_eq!(deps.images[0].id, "link://0");
    assert_eq!(
        deps.images[0].url.as_str(),
        "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAA"
    );
    assert_eq!(deps.icons.len(), 1);
    assert_eq!(deps.icons[0].id, "link://1");
    assert_eq!(deps.icons[0].url.as_str(), "file:///z:/path/to/assets/favicon.ico");

    assert!(!stripped.contains("href="));
    assert!(!stripped.contains("src="));
    // the stripped element keeps every other attribute next to its marker
    assert!(stripped.contains(r#"rel="icon""#));
    assert!(stripped.contains(r#"width="128""#));
    assert!(stripped.contains(r#"style="background-color: red;""#));
    assert!(stripped.contains(r#"res-link="link://1""#));
    assert!(stripped.contains(r#"res-link="link://0""#));
}

#[test]
fn document_without_dependencies_keeps_its_doctype() {
    let html = r#"<!DOCTYPE html PUBLIC "HelloSystems" "IBM MainFrame">
<html>
	<head>
		<title>Test Page</title>
	</head>
	<body>
		<p>No resources linked here.</p>
	</body>
</html>"#;

    let config = ExtractConfig::default();
    let (stripped, deps) = linked::extract_html(html, "/path/to/index.html", &config).unwrap();

    assert!(deps.is_empty());
    assert!(!stripped.contains("res-link"));
    assert!(
        stripped.starts_with("<!DOCTYPE html PUBLIC \"HelloSystems\" \"IBM MainFrame\">\n"),
        "the doctype was not preserved: {stripped}"
    );
}

#[test]
fn extracts_mixed_kinds_in_deterministic_order() {
    let html = r#"<!DOCTYPE html>
<html>
	<head>
		<script src="./app.js"></script>
		<link rel="stylesheet" href="https://cdn.example.com/styles.css">
		<link rel="icon" href="https://example.com/favicon.ico">
	</head>
	<body>
		<img src="./logo.png">
	</body>
</html>"#;

    let config = ExtractConfig::default();
    let (stripped, deps) = linked::extract_html(html, "k:/path/to/index.html", &config).unwrap();

    // kinds are processed script, stylesheet, image, icon
    assert_eq!(deps.scripts[0].id, "link://0");
    assert_eq!(deps.scripts[0].url.as_str(), "file:///k:/path/to/app.js");
    assert_eq!(deps.styles[0].id, "link://1");
    assert_eq!(deps.styles[0].url.as_str(), "https://cdn.example.com/styles.css");
    assert_eq!(deps.images[0].id, "link://2");
    assert_eq!(deps.images[0].url.as_str(), "file:///k:/path/to/logo.png");
    assert_eq!(deps.icons[0].id, "link://3");
    assert_eq!(deps.icons[0].url.as_str(), "https://example.com/favicon.ico");

    assert!(stripped.starts_with("<!DOCTYPE html>\n"));
    assert_eq!(deps.len(), 4);
    assert_eq!(
        deps.resolved_urls(),
        vec![
            "file:///k:/path/to/app.js",
            "https://cdn.example.com/styles.css",
            "file:///k:/path/to/logo.png",
            "https://example.com/favicon.ico",
        ]
    );
}

#[test]
fn reinsertion_restores_kind_appropriate_attributes() {
    let html = r#"<html><head>
		<script src="./app.js"></script>
		<link rel="stylesheet" href="./styles.css">
	</head></html>"#;

    let config = ExtractConfig::default();
    let (stripped, deps) = linked::extract_html(html, "/srv/site/index.html", &config).unwrap();

    let outputs = vec!["./bundle/app.min.js".to_string(), "./bundle/styles.min.css".to_string()];
    let restored = linked::reinsert_html(&stripped, &deps, &outputs, &config).unwrap();

    assert!(restored.contains(r#"src="./bundle/app.min.js""#));
    assert!(restored.contains(r#"href="./bundle/styles.min.css""#));
    assert!(restored.contains(r#"rel="stylesheet""#));
    assert!(!restored.contains("res-link"), "markers must be consumed: {restored}");
}

#[test]
fn reinsertion_with_untouched_urls_reproduces_the_references() {
    let html = r#"<html><head><script src="https://cdn.example.com/lib.js"></script></head></html>"#;

    let config = ExtractConfig::default();
    let (stripped, deps) = linked::extract_html(html, "/srv/site/index.html", &config).unwrap();
    let restored = linked::reinsert_html(&stripped, &deps, &deps.resolved_urls(), &config).unwrap();

    assert!(restored.contains(r#"src="https://cdn.example.com/lib.js""#));
    assert!(!restored.contains("res-link"));
}

#[test]
fn count_mismatch_is_rejected_before_touching_the_document() {
    let html = r#"<html><head><script src="./a.js"></script></head></html>"#;
    let config = ExtractConfig::default();
    let (stripped, deps) = linked::extract_html(html, "/srv/site/index.html", &config).unwrap();

    let err = linked::reinsert_html(&stripped, &deps, &[], &config).unwrap_err();
    assert!(matches!(err, GraftError::CountMismatch { expected: 1, provided: 0 }));
}

#[test]
fn lookup_failure_names_the_missing_id() {
    let html = r#"<html><head><script src="./a.js"></script></head></html>"#;
    let config = ExtractConfig::default();
    let (_, deps) = linked::extract_html(html, "/srv/site/index.html", &config).unwrap();

    // a build step that dropped the marked element corrupts the round trip
    let corrupted = "<html><head></head><body></body></html>";
    let outputs = deps.resolved_urls();
    let err = linked::reinsert_html(corrupted, &deps, &outputs, &config).unwrap_err();
    match err {
        GraftError::MissingPlaceholder { id } => assert_eq!(id, "link://0"),
        other => panic!("expected MissingPlaceholder, got {other:?}"),
    }
}

#[test]
fn leftover_marker_without_an_entry_is_an_error() {
    let html = r#"<html><body><p res-link="link://9">orphan</p></body></html>"#;
    let config = ExtractConfig::default();
    let err = linked::reinsert_html(html, &LinkedDeps::default(), &[], &config).unwrap_err();
    match err {
        GraftError::UnmatchedPlaceholder { id } => assert_eq!(id, "link://9"),
        other => panic!("expected UnmatchedPlaceholder, got {other:?}"),
    }
}

#[test]
fn rescanning_a_stripped_document_extracts_nothing_new() {
    let html = r#"<html><head>
		<script src="./a.js"></script>
		<img src="./b.png">
	</head></html>"#;
    let config = ExtractConfig::default();

    let doc = HtmlDocument::parse(html);
    let base = dir_url_from_file("/srv/site/index.html").unwrap();
    let mut ids = ResourceIds::new();

    let first = linked::extract(&doc, &base, &mut ids, &config).unwrap();
    let second = linked::extract(&doc, &base, &mut ids, &config).unwrap();

    assert_eq!(first.len(), 2);
    assert!(second.is_empty(), "marked elements must not be re-extracted");

    // and the same holds across a serialize/reparse boundary
    let (stripped, _) = linked::extract_html(html, "/srv/site/index.html", &config).unwrap();
    let (_, rescan) = linked::extract_html(&stripped, "/srv/site/index.html", &config).unwrap();
    assert!(rescan.is_empty());
}
