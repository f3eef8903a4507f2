use rs_ebook_clean::dom;
use rs_ebook_clean::rules::{generic_post_rules, generic_pre_rules};
use rs_ebook_clean::{run_operations, Error, OperationKind, OperationSet};

fn single(kind: OperationKind, arg: &str) -> OperationSet {
    OperationSet::new()
        .with(kind, [arg])
        .unwrap_or_else(|e| panic!("valid {kind} argument {arg:?}: {e}"))
}

#[test]
fn remove_element_is_idempotent() {
    let set = single(OperationKind::RemoveElement, ".ad, script");
    let html = r#"<div><p>keep</p><div class="ad"><script>x()</script>buy</div><script>y()</script></div>"#;

    let once = run_operations(html, &set);
    let twice = run_operations(once.as_str(), &set);
    assert_eq!(once, "<div><p>keep</p></div>");
    assert_eq!(once, twice);
}

#[test]
fn filter_paragraphless_removes_articles_with_few_paragraphs() {
    let set = single(OperationKind::FilterParagraphless, "article");
    assert_eq!(run_operations("<article><p>Hello</p></article>", &set), "");

    let three = "<article><p>a</p><p>b</p><p>c</p></article>";
    assert_eq!(run_operations(three, &set), three);
}

#[test]
fn merge_nodes_concatenates_in_document_order() {
    let set = single(OperationKind::MergeNodes, ".merge");
    let html = r#"<div class="merge"><p>First</p></div><p>between</p><div class="merge"><p>Second</p></div>"#;
    let out = run_operations(html, &set);

    let doc = dom::parse(&out);
    let merged = doc.select(".merge");
    assert_eq!(merged.length(), 1);
    assert_eq!(merged.inner_html().to_string(), "<p>First</p><p>Second</p>");
    assert!(out.contains("<p>between</p>"));
}

#[test]
fn convert_to_div_replaces_section() {
    let set = single(OperationKind::ConvertToDiv, "section");
    assert_eq!(run_operations("<section>Hello World</section>", &set), "<div>Hello World</div>");
}

#[test]
fn arguments_run_in_list_order() {
    // "div > div" only matches once the section has been unwrapped.
    let html = "<div><section><div>x</div></section></div>";

    let set = OperationSet::from_json(r#"{"replaceWithChildren": ["section", "div > div"]}"#).unwrap();
    assert_eq!(run_operations(html, &set), "<div>x</div>");

    let reversed = OperationSet::from_json(r#"{"replaceWithChildren": ["div > div", "section"]}"#).unwrap();
    assert_eq!(run_operations(html, &reversed), "<div><div>x</div></div>");
}

#[test]
fn filter_divs_joins_list_into_case_insensitive_alternation() {
    let set = OperationSet::from_json(r#"{"filterDivs": [["promo", "share"]]}"#).unwrap();
    let html = r#"<div class="PromoBox">a</div><div id="social-share">b</div><div class="body">c</div>"#;
    assert_eq!(run_operations(html, &set), r#"<div class="body">c</div>"#);
}

#[test]
fn unknown_operation_rejected_at_load() {
    let err = OperationSet::from_json(r#"{"removeElement": ["p"], "explode": ["p"]}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidRuleSet(_)), "got {err:?}");
}

#[test]
fn bad_arguments_rejected_at_load() {
    let err = OperationSet::from_json(r#"{"replaceDivsWithChildren": ["[a-"]}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidRuleSet(_)), "got {err:?}");
    assert!(err.to_string().contains("replaceDivsWithChildren"));
}

#[test]
fn tree_input_is_transformed_in_place() {
    let doc = dom::parse("<section><code><b>x</b></code></section>");
    let set = OperationSet::new()
        .with(OperationKind::ConvertToDiv, ["section"])
        .unwrap()
        .with(OperationKind::ReplaceWithInnerText, ["code"])
        .unwrap();

    let out = run_operations(&doc, &set);
    assert!(std::ptr::eq(out, &doc));
    assert_eq!(dom::body_html(&doc), "<div><code>x</code></div>");
}

#[test]
fn generic_pre_rules_strip_boilerplate() {
    let html = r#"<html><head><title>T</title><script>track()</script></head><body>
        <nav>Menu</nav>
        <div class="social-share">Share</div>
        <div style="display:none">hidden</div>
        <article><p>Story text.</p><p>More story.</p><p>Last bit.</p></article>
        <footer>Copyright</footer>
    </body></html>"#;

    let out = run_operations(html, generic_pre_rules());
    assert!(out.contains("Story text."));
    assert!(out.contains("<title>T</title>"));
    for gone in ["track()", "Menu", "Share", "hidden", "Copyright"] {
        assert!(!out.contains(gone), "{gone} should have been removed: {out}");
    }
}

#[test]
fn generic_post_rules_mark_rtl_paragraphs() {
    let out = run_operations("<p>Hello</p><p>مرحبا بالعالم</p>", generic_post_rules());
    assert_eq!(out, r#"<p>Hello</p><p dir="rtl">مرحبا بالعالم</p>"#);
}
