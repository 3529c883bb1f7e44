use std::sync::Arc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nxql_core::analysis::fulltext::analyze;
use nxql_core::analysis::matcher::FulltextMatcher;
use nxql_core::core::config::{EngineConfig, FulltextConfig};
use nxql_core::query::ast::{Expression, MultiExpression, Operand, Operator};
use nxql_core::query::evaluator::ExpressionEvaluator;
use nxql_core::query::optimizer::QueryOptimizer;
use nxql_core::query::resolver::{StateReferenceResolver, StaticPathResolver};
use nxql_core::query::sql::SqlQuery;
use nxql_core::schema::schema::{DocumentTypeDef, SchemaRegistry};
use nxql_core::state::state::State;
use nxql_core::state::value::StateValue;
use rand::Rng;

fn registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .add_type(DocumentTypeDef::new("Document")).unwrap()
        .add_type(DocumentTypeDef::new("File").extends("Document")).unwrap()
        .add_type(DocumentTypeDef::new("Folder").extends("Document").with_facet("Folderish")).unwrap()
        .add_no_per_instance_facet("Folderish")
}

fn create_documents(count: usize) -> Vec<State> {
    let mut rng = rand::thread_rng();
    let subjects = ["art", "music", "science", "sport", "history"];
    (0..count)
        .map(|i| {
            let mut doc = State::new();
            doc.put("ecm:uuid", format!("doc-{}", i));
            doc.put("ecm:primaryType", if i % 3 == 0 { "Folder" } else { "File" });
            doc.put("dc:title", format!("Document {}", i));
            doc.put("size", rng.gen_range(0..10_000i64));
            doc.put(
                "dc:subjects",
                StateValue::array((0..2).map(|_| subjects[rng.gen_range(0..subjects.len())])),
            );
            doc
        })
        .collect()
}

fn predicate() -> Operand {
    MultiExpression::and(vec![
        Expression::new(Operand::reference("dc:title"), Operator::Like, Operand::string("Document 1%")).into(),
        Expression::new(Operand::reference("size"), Operator::Gt, Operand::integer(5_000)).into(),
        Expression::new(Operand::reference("dc:subjects/*"), Operator::In, Operand::strings(["art", "music"])).into(),
    ])
    .into()
}

fn bench_evaluate(c: &mut Criterion) {
    let docs = create_documents(1_000);
    let types = registry();
    let evaluator = ExpressionEvaluator::new(EngineConfig::default(), Arc::new(StaticPathResolver::new()));
    let predicate = predicate();

    c.bench_function("evaluate_1000_documents", |b| {
        b.iter(|| {
            let mut matched = 0;
            for doc in &docs {
                let mut resolver = StateReferenceResolver::new(doc, &types);
                if evaluator.evaluate(black_box(&predicate), &mut resolver).unwrap().is_true() {
                    matched += 1;
                }
            }
            matched
        });
    });
}

fn bench_optimize(c: &mut Criterion) {
    let optimizer = QueryOptimizer::new(Arc::new(registry()));
    let query = SqlQuery::select_from(&["Document"]).with_where(MultiExpression::and(vec![
        Expression::new(Operand::reference("ecm:primaryType"), Operator::NotEq, Operand::string("File")).into(),
        Expression::new(Operand::reference("files/*1/name"), Operator::Eq, Operand::string("a")).into(),
        Expression::new(Operand::reference("files/*1/length"), Operator::Gt, Operand::integer(10)).into(),
        Expression::new(Operand::reference("dc:title"), Operator::Like, Operand::string("x%")).into(),
    ]));

    c.bench_function("optimize_query", |b| {
        b.iter(|| optimizer.optimize(black_box(&query)).unwrap());
    });
}

fn bench_fulltext(c: &mut Criterion) {
    let matcher = FulltextMatcher::new(&FulltextConfig::default());
    let text = "The quick brown fox jumps over the lazy dog while the cat sleeps near the warm fireplace";
    let query = analyze("\"quick brown\" fox -elephant OR sleep*").unwrap().unwrap();

    c.bench_function("fulltext_parse", |b| {
        b.iter(|| analyze(black_box("\"quick brown\" fox -elephant OR sleep*")).unwrap());
    });
    c.bench_function("fulltext_match", |b| {
        b.iter(|| matcher.matches(black_box(&query), black_box(text)));
    });
}

criterion_group!(benches, bench_evaluate, bench_optimize, bench_fulltext);
criterion_main!(benches);
