//! Integration tests for mock, spy and on_error.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Notify;
use zfn::{MaybeAsync, SyncFunction, Validators, Value, zfn};
use zfn_testutil::SpyRecorder;

fn double() -> SyncFunction {
    zfn()
        .args([Validators.number()])
        .unwrap()
        .create(|args: Vec<Value>| anyhow::Ok(json!(args[0].as_i64().unwrap_or_default() * 2)))
}

fn run(f: &SyncFunction, n: i64) -> Value {
    f.call(vec![json!(n)])
        .into_ready()
        .expect("synchronous")
        .expect("successful call")
}

#[test]
fn mock_replaces_and_reset_restores() {
    let f = double();
    assert_eq!(run(&f, 4), json!(8));

    f.mock(|_| anyhow::Ok(json!("mocked")));
    assert_eq!(run(&f, 4), json!("mocked"));

    f.reset_mock();
    assert_eq!(run(&f, 4), json!(8));
}

#[test]
fn mock_still_goes_through_validation() {
    let f = double();
    f.mock(|args: Vec<Value>| anyhow::Ok(args[0].clone()));
    let err = f.call(vec![json!("4")]).into_ready().unwrap().unwrap_err();
    assert!(err.message().starts_with("Validation failed for 1st argument"));
}

#[test]
fn spy_sees_args_result_and_one_based_count() {
    let f = double();
    let recorder = SpyRecorder::new();
    f.spy(recorder.handler());

    run(&f, 1);
    run(&f, 2);

    let calls = recorder.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].args, vec![json!(1)]);
    assert_eq!(calls[0].result, json!(2));
    assert_eq!(recorder.counts(), vec![1, 2]);
    assert_eq!(f.spy_count(), 2);
}

#[test]
fn failed_calls_are_not_counted() {
    let f = double();
    let recorder = SpyRecorder::new();
    f.spy(recorder.handler());
    assert!(f.call(vec![json!("nope")]).into_ready().unwrap().is_err());
    assert_eq!(f.spy_count(), 0);
    assert!(recorder.is_empty());
}

#[test]
fn replacing_the_spy_restarts_the_count() {
    let f = double();
    let first = SpyRecorder::new();
    let second = SpyRecorder::new();

    f.spy(first.handler());
    run(&f, 1);
    run(&f, 1);
    f.spy(second.handler());
    run(&f, 1);

    assert_eq!(first.counts(), vec![1, 2]);
    assert_eq!(second.counts(), vec![1]);
}

#[test]
fn reset_spy_removes_observer_and_zeroes_count() {
    let f = double();
    let recorder = SpyRecorder::new();
    f.spy(recorder.handler());
    run(&f, 1);

    f.reset_spy();
    assert_eq!(f.spy_count(), 0);
    run(&f, 1);
    assert_eq!(recorder.len(), 1);
    assert_eq!(f.spy_count(), 1);
}

#[test]
fn on_error_recovers_with_the_validated_args() {
    let f = zfn()
        .args([Validators.string().transform(|v| json!(v.as_str().unwrap_or_default().len()))])
        .unwrap()
        .create(|_| -> anyhow::Result<Value> { anyhow::bail!("boom") });
    f.on_error(|err, args| anyhow::Ok(json!({"error": err.to_string(), "args": args})));
    let out = f.call(vec![json!("abc")]).into_ready().unwrap().unwrap();
    assert_eq!(out, json!({"error": "boom", "args": [3]}));
}

#[test]
fn later_on_error_replaces_earlier() {
    let f = zfn().create(|_| -> anyhow::Result<Value> { anyhow::bail!("boom") });
    f.on_error(|_, _| anyhow::Ok(json!("first")));
    f.on_error(|_, _| anyhow::Ok(json!("second")));
    assert_eq!(f.call(vec![]).into_ready().unwrap().unwrap(), json!("second"));
}

#[test]
fn mutators_chain_and_act_independently() {
    let f = double();
    let recorder = SpyRecorder::new();
    f.mock(|_| -> anyhow::Result<Value> { anyhow::bail!("mock failed") })
        .spy(recorder.handler())
        .on_error(|_, _| anyhow::Ok(json!(-1)));

    assert_eq!(run(&f, 5), json!(-1));
    assert_eq!(recorder.calls()[0].result, json!(-1));

    f.reset_mock();
    assert_eq!(run(&f, 5), json!(10));
    assert_eq!(recorder.counts(), vec![1, 2]);
}

#[test]
fn clones_share_instrumentation() {
    let f = double();
    let handle = f.clone();
    handle.mock(|_| anyhow::Ok(json!(0)));
    assert_eq!(run(&f, 3), json!(0));
}

#[test]
fn siblings_from_one_builder_are_independent() {
    let builder = zfn().args([Validators.number()]).unwrap();
    let a = builder.create(|_| anyhow::Ok(json!("a")));
    let b = builder.create(|_| anyhow::Ok(json!("b")));
    let recorder = SpyRecorder::new();

    a.mock(|_| anyhow::Ok(json!("mocked"))).spy(recorder.handler());

    assert_eq!(run(&a, 1), json!("mocked"));
    assert_eq!(run(&b, 1), json!("b"));
    assert_eq!(recorder.len(), 1);
    assert_eq!(b.spy_count(), 1);
    assert_eq!(a.spy_count(), 1);
}

#[tokio::test]
async fn in_flight_calls_see_later_instrumentation() {
    zfn_testutil::init_tracing();
    let gate = Arc::new(Notify::new());
    let waiting = gate.clone();
    let f = zfn().create_async(move |_| {
        let waiting = waiting.clone();
        MaybeAsync::pending(async move {
            waiting.notified().await;
            anyhow::Ok(json!("done"))
        })
    });

    let in_flight = tokio::spawn(f.call(vec![]));
    tokio::task::yield_now().await;

    let recorder = SpyRecorder::new();
    f.spy(recorder.handler());
    gate.notify_one();

    assert_eq!(in_flight.await.unwrap().unwrap(), json!("done"));
    assert_eq!(recorder.counts(), vec![1]);
}
