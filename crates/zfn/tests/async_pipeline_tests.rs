//! Integration tests for functions made by `create_async`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use zfn::{ErrorKind, MaybeAsync, Signature, Validators, Value, zfn};
use zfn_testutil::schemas::{AsyncOnly, Suspending, shared};
use zfn_testutil::{CallCounter, SpyRecorder};

#[tokio::test]
async fn always_returns_a_future() {
    zfn_testutil::init_tracing();
    let f = zfn()
        .build(|z| Signature::new().args([z.number(), z.number()]).returns(z.number()))
        .unwrap()
        .create_async(|args: Vec<Value>| {
            let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
            anyhow::Ok(json!(sum))
        });

    let pending = f.call(vec![json!(5), json!(13)]);
    assert_eq!(pending.await.unwrap(), json!(18));
}

#[tokio::test]
async fn async_refinements_are_awaited() {
    let z = Validators;
    let f = zfn()
        .args([z.string().refine_async(|v| async move { v != json!("taken") }, "Username taken")])
        .unwrap()
        .create_async(|args: Vec<Value>| anyhow::Ok(args[0].clone()));

    assert_eq!(f.call(vec![json!("free")]).await.unwrap(), json!("free"));
    let err = f.call(vec![json!("taken")]).await.unwrap_err();
    assert_eq!(err.message(), "Validation failed for 1st argument - Username taken");
}

#[tokio::test]
async fn suspending_sync_parse_is_fine_here() {
    let f = zfn()
        .args([shared(Suspending)])
        .unwrap()
        .returns(shared(Suspending))
        .unwrap()
        .create_async(|args: Vec<Value>| anyhow::Ok(args[0].clone()));
    assert_eq!(f.call(vec![json!(3)]).await.unwrap(), json!(3));
}

#[tokio::test]
async fn async_only_schema_works() {
    let f = zfn()
        .args([shared(AsyncOnly)])
        .unwrap()
        .create_async(|args: Vec<Value>| anyhow::Ok(args[0].clone()));
    assert_eq!(f.call(vec![json!("x")]).await.unwrap(), json!("x"));
}

#[tokio::test]
async fn async_only_schema_fails_in_sync_wrapper() {
    let f = zfn()
        .args([shared(AsyncOnly)])
        .unwrap()
        .create(|args: Vec<Value>| anyhow::Ok(args[0].clone()));
    let err = f.call(vec![json!("x")]).resolve().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn return_is_validated_after_recovery() {
    let f = zfn()
        .returns(Validators.number())
        .unwrap()
        .create_async(|_| MaybeAsync::pending(async { Err::<Value, _>(anyhow::anyhow!("down")) }));
    let recorder = SpyRecorder::new();
    f.on_error(|_, _| anyhow::Ok(json!("fallback"))).spy(recorder.handler());

    let err = f.call(vec![]).await.unwrap_err();
    assert!(err.message().starts_with("Validation failed for return value"));
    assert!(recorder.is_empty(), "spy never sees an invalid result");

    f.on_error(|_, _| MaybeAsync::pending(async { anyhow::Ok(json!(0)) }));
    assert_eq!(f.call(vec![]).await.unwrap(), json!(0));
    assert_eq!(recorder.calls()[0].result, json!(0));
}

#[tokio::test]
async fn handler_errors_propagate_unmodified() {
    let f = zfn().create_async(|_| -> anyhow::Result<Value> { anyhow::bail!("original") });
    f.on_error(|err, _| -> anyhow::Result<Value> { Err(err.context("while handling")) });
    let err = f.call(vec![]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
    assert_eq!(err.message(), "while handling");
    let inner = err.into_execution().unwrap();
    assert_eq!(inner.root_cause().to_string(), "original");
}

#[tokio::test]
async fn argument_failures_never_run_the_implementation() {
    let ran = CallCounter::new();
    let seen = ran.clone();
    let f = zfn().args([Validators.number()]).unwrap().create_async(move |_| {
        seen.hit();
        anyhow::Ok(Value::Null)
    });
    let err = f.call(vec![json!(false)]).await.unwrap_err();
    let message = err.message();
    assert!(message.starts_with("Validation failed for 1st argument - false"), "{}", message);
    assert!(message.contains("not of type"), "{}", message);
    assert_eq!(ran.get(), 0);
}

#[tokio::test]
async fn spy_count_follows_completion_order() {
    let f = zfn().create_async(|args: Vec<Value>| {
        let delay = args[0].as_u64().unwrap_or_default();
        MaybeAsync::pending(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            anyhow::Ok(json!(delay))
        })
    });
    let recorder = SpyRecorder::new();
    f.spy(recorder.handler());

    let slow = f.call(vec![json!(80)]);
    let fast = f.call(vec![json!(5)]);
    let (slow, fast) = tokio::join!(slow, fast);
    assert_eq!(slow.unwrap(), json!(80));
    assert_eq!(fast.unwrap(), json!(5));

    let calls = recorder.calls();
    assert_eq!(calls[0].result, json!(5));
    assert_eq!(calls[0].count, 1);
    assert_eq!(calls[1].result, json!(80));
    assert_eq!(calls[1].count, 2);
}

#[tokio::test]
async fn pending_spy_is_awaited_before_the_call_resolves() {
    let f = zfn().create_async(|_| anyhow::Ok(json!("value")));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    f.spy(move |_, result, count| {
        let sink = sink.clone();
        MaybeAsync::pending(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            sink.lock().unwrap().push((result, count));
            anyhow::Ok(())
        })
    });

    assert_eq!(f.call(vec![]).await.unwrap(), json!("value"));
    assert_eq!(*seen.lock().unwrap(), vec![(json!("value"), 1)]);

    f.spy(|_, _, _| MaybeAsync::pending(async { Err::<(), _>(anyhow::anyhow!("spy gave up")) }));
    let err = f.call(vec![]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
    assert_eq!(err.message(), "spy gave up");
    assert_eq!(f.spy_count(), 1);
}

#[tokio::test]
async fn dropped_call_still_runs_to_completion() {
    let ran = CallCounter::new();
    let seen = ran.clone();
    let f = zfn()
        .args([Validators.number()])
        .unwrap()
        .create_async(move |args: Vec<Value>| {
            seen.hit();
            anyhow::Ok(args[0].clone())
        });
    let recorder = SpyRecorder::new();
    f.spy(recorder.handler());

    drop(f.call(vec![json!(1)]));
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(ran.get(), 1);
    assert_eq!(recorder.counts(), vec![1]);
    assert_eq!(f.spy_count(), 1);
}

#[tokio::test]
#[should_panic(expected = "implementation blew up")]
async fn panics_reach_whoever_awaits_the_call() {
    let f = zfn().create_async(|_| -> anyhow::Result<Value> { panic!("implementation blew up") });
    let _ = f.call(vec![]).await;
}
