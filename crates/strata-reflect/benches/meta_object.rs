use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_reflect::{ClassBuilder, ClassRef, MetaContext, MetaObject, PropertyTokenizer, TypeRef, Value};

fn order_class() -> ClassRef {
    let address = ClassBuilder::new("Address")
        .property("city", TypeRef::Str)
        .build();
    let customer = ClassBuilder::new("Customer")
        .property("name", TypeRef::Str)
        .property("address", TypeRef::bean(&address))
        .build();
    ClassBuilder::new("Order")
        .property("id", TypeRef::Long)
        .property("customer", TypeRef::bean(&customer))
        .property("tags", TypeRef::list_of(TypeRef::Str))
        .build()
}

fn bench_tokenizer(c: &mut Criterion) {
    c.bench_function("tokenize_path", |b| {
        b.iter(|| {
            PropertyTokenizer::new(black_box("orders[12].customer.address.city"))
                .segments()
                .count()
        });
    });
}

fn bench_get_value(c: &mut Criterion) {
    let class = order_class();
    let ctx = MetaContext::default();
    let meta = MetaObject::with_context(Value::object(&class), ctx);
    meta.set_value("customer.address.city", Value::from("Oslo")).unwrap();
    meta.set_value("tags", Value::list(vec![Value::from("a"), Value::from("b")]))
        .unwrap();

    let mut group = c.benchmark_group("get_value");
    for path in ["id", "customer.name", "customer.address.city", "tags[1]"] {
        group.bench_with_input(BenchmarkId::from_parameter(path), &path, |b, path| {
            b.iter(|| meta.get_value(black_box(path)).unwrap());
        });
    }
    group.finish();
}

fn bench_set_value(c: &mut Criterion) {
    let class = order_class();
    let ctx = MetaContext::default();

    c.bench_function("set_value_existing", |b| {
        let meta = MetaObject::with_context(Value::object(&class), ctx.clone());
        meta.set_value("customer.name", Value::from("x")).unwrap();
        b.iter(|| meta.set_value(black_box("customer.name"), Value::from("y")).unwrap());
    });

    c.bench_function("set_value_vivify", |b| {
        b.iter(|| {
            let meta = MetaObject::with_context(Value::object(&class), ctx.clone());
            meta.set_value(black_box("customer.address.city"), Value::from("Rome"))
                .unwrap();
        });
    });
}

criterion_group!(benches, bench_tokenizer, bench_get_value, bench_set_value);
criterion_main!(benches);
