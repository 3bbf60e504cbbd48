//! End-to-end assertion scenarios: raw query with tokens, XML document,
//! typed outcome, comparison against an expected literal.

use xmlcheck::{
    CheckError, QueryOutcome, TestContext, UtcFormatter, XmlDocument, evaluate,
    evaluate_and_compare, substitute,
};

const RESPONSE: &str = r#"<Result>
<Item type="Part" state="Released"><item_number>P-1001</item_number><cost>42.5</cost></Item>
<Item type="Part"><item_number>P-1002</item_number><cost>7.25</cost></Item>
</Result>"#;

fn ctx() -> TestContext {
    let _ = env_logger::builder().is_test(true).try_init();
    TestContext::capture("ACME", "U-42", &UtcFormatter)
}

#[test]
fn boolean_outcome_compares_against_both_spellings() {
    let doc = XmlDocument::parse(RESPONSE).unwrap();
    let ctx = ctx();
    assert!(evaluate_and_compare("count(//Item) = 2", Some(&doc), &ctx, "true").unwrap());
    assert!(evaluate_and_compare("count(//Item) = 2", Some(&doc), &ctx, "1").unwrap());
    assert!(!evaluate_and_compare("count(//Item) = 3", Some(&doc), &ctx, "true").unwrap());
}

#[test]
fn numeric_outcome_is_exact() {
    let doc = XmlDocument::parse(RESPONSE).unwrap();
    let ctx = ctx();
    assert!(evaluate_and_compare("count(//Item)", Some(&doc), &ctx, "2").unwrap());
    assert!(!evaluate_and_compare("count(//Item)", Some(&doc), &ctx, "2.0001").unwrap());
    assert!(evaluate_and_compare("sum(//cost)", Some(&doc), &ctx, "49.75").unwrap());
}

#[test]
fn single_leaf_element_collapses_to_its_text() {
    let doc = XmlDocument::parse(RESPONSE).unwrap();
    let outcome = evaluate("/Result/Item[1]/item_number", Some(&doc), &ctx()).unwrap();
    let QueryOutcome::String(s) = outcome else {
        panic!("expected string outcome, got {:?}", outcome);
    };
    assert_eq!(s, "P-1001");
}

#[test]
fn multiple_text_nodes_concatenate_in_document_order() {
    let doc = XmlDocument::parse("<r><a>one</a><b>two</b><c>three</c></r>").unwrap();
    let outcome = evaluate("//text()", Some(&doc), &ctx()).unwrap();
    let QueryOutcome::String(s) = outcome else {
        panic!("expected string outcome, got {:?}", outcome);
    };
    assert_eq!(s, "onetwothree");
}

#[test]
fn attribute_selection_concatenates_values() {
    let doc = XmlDocument::parse(RESPONSE).unwrap();
    let outcome = evaluate("//Item/@type", Some(&doc), &ctx()).unwrap();
    let QueryOutcome::String(s) = outcome else {
        panic!("expected string outcome, got {:?}", outcome);
    };
    assert_eq!(s, "PartPart");
}

#[test]
fn multi_element_selection_stays_a_node_set() {
    let doc = XmlDocument::parse(RESPONSE).unwrap();
    let outcome = evaluate("//Item", Some(&doc), &ctx()).unwrap();
    let QueryOutcome::NodeSet(nodes) = outcome else {
        panic!("expected node-set outcome, got {:?}", outcome);
    };
    assert_eq!(nodes.len(), 2);
    // Direct comparison on a node-set is a caller error and answers false.
    assert!(!evaluate_and_compare("//Item", Some(&doc), &ctx(), "anything").unwrap());
}

#[test]
fn zero_matches_is_empty_and_never_equal() {
    let doc = XmlDocument::parse(RESPONSE).unwrap();
    let ctx = ctx();
    let outcome = evaluate("//Missing", Some(&doc), &ctx).unwrap();
    assert!(matches!(outcome, QueryOutcome::Empty));
    assert!(!evaluate_and_compare("//Missing", Some(&doc), &ctx, "").unwrap());
}

#[test]
fn node_query_without_document_fails() {
    let err = evaluate("//Item", None, &ctx()).unwrap_err();
    assert!(matches!(err, CheckError::NoDataAvailable { .. }));

    // Even a query that would match nothing must not degrade to Empty.
    let err = evaluate("//Missing", None, &ctx()).unwrap_err();
    assert!(matches!(err, CheckError::NoDataAvailable { .. }));
}

#[test]
fn scalar_queries_work_without_a_document() {
    let ctx = ctx();
    assert!(evaluate_and_compare("1 + 2", None, &ctx, "3").unwrap());
    assert!(evaluate_and_compare("x:Database() = 'ACME'", None, &ctx, "true").unwrap());
    assert!(evaluate_and_compare("string-length(x:FixedNewId())", None, &ctx, "32").unwrap());
}

#[test]
fn comment_only_selection_is_unsupported() {
    let doc = XmlDocument::parse("<r><!-- a --><!-- b --></r>").unwrap();
    let err = evaluate("//comment()", Some(&doc), &ctx()).unwrap_err();
    assert!(matches!(err, CheckError::UnsupportedResultShape { .. }));
}

#[test]
fn malformed_query_propagates_a_query_error() {
    let doc = XmlDocument::parse(RESPONSE).unwrap();
    let err = evaluate("//Item[", Some(&doc), &ctx()).unwrap_err();
    assert!(matches!(err, CheckError::Query(_)));
}

#[test]
fn substitution_happens_before_evaluation() {
    // The substituted text is plain literals by the time the parser sees it.
    let ctx = ctx();
    let substituted = substitute("x:Database()='ACME' and x:UserId()=y:currentUserId()", &ctx);
    assert_eq!(substituted, "'ACME'='ACME' and 'U-42'=y:currentUserId()");

    // And an expression built purely from tokens evaluates with no document.
    assert!(evaluate_and_compare("x:UserId() = 'U-42'", None, &ctx, "true").unwrap());
}

#[test]
fn fixed_id_is_stable_within_one_context() {
    let ctx = ctx();
    assert!(evaluate_and_compare("x:FixedNewId() = x:FixedNewId()", None, &ctx, "true").unwrap());
    assert!(evaluate_and_compare("x:NewId() = x:NewId()", None, &ctx, "false").unwrap());
}

#[test]
fn tokens_resolve_inside_predicates() {
    let doc =
        XmlDocument::parse(r#"<Result><Item owner="U-42"><id>17</id></Item></Result>"#).unwrap();
    let ctx = ctx();
    assert!(
        evaluate_and_compare("//Item[@owner = x:UserId()]/id", Some(&doc), &ctx, "17").unwrap()
    );
}

#[test]
fn failure_diagnostics_render_canonically() {
    let doc = XmlDocument::parse(RESPONSE).unwrap();
    let outcome = evaluate("count(//Item) = 3", Some(&doc), &ctx()).unwrap();
    assert_eq!(outcome.to_string(), "0");
}
