use std::time::Duration;

use deferred::{ap, runtimes::tokio::after, Computation, SettleError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, PartialEq)]
enum Lookup {
    Missing(String),
    Unavailable,
}

fn price(item: &'static str) -> Computation<Lookup, u32> {
    let delay = Duration::from_millis(fastrand::u64(5..50));
    match item {
        "apple" => after(delay, 30),
        "pear" => after(delay, 45),
        "cherry" => deferred::runtimes::tokio::reject_after(delay, Lookup::Unavailable),
        other => Computation::fail(Lookup::Missing(other.to_owned())),
    }
}

fn basket_total(items: &[&'static str]) -> Computation<Lookup, u32> {
    items.iter().fold(Computation::succeed(0), |total, &item| {
        let add = total.map(|sum| move |price: u32| sum + price);
        ap(add, price(item))
    })
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();

    let fruit = basket_total(&["apple", "pear", "apple"]);
    assert_eq!(fruit.settle().await, Ok(105));

    // an unavailable item prices the basket at zero instead of failing it
    let with_fallback = basket_total(&["apple", "cherry"]).reject_chain(|lookup| match lookup {
        Lookup::Unavailable => after(Duration::from_millis(1), 0),
        missing => Computation::fail(missing),
    });
    assert_eq!(with_fallback.settle().await, Ok(0));

    match basket_total(&["apple", "durian"]).settle().await {
        Err(SettleError::Failed(Lookup::Missing(item))) => println!("no price for {item}"),
        other => panic!("unexpected settlement: {other:?}"),
    }

    // a long chain of timer steps still settles on a flat stack
    let mut countdown = after::<Lookup, u32>(Duration::from_millis(1), 0);
    for _ in 0..1_000 {
        countdown = countdown.chain(|n| after(Duration::ZERO, n + 1));
    }
    println!("counted to {}", countdown.settle().await.unwrap_or_default());
}
