//! webact-cli: demonstrates the activity scheduler end to end.
//!
//! Builds a small diamond (`starter -> {fetch_user, fetch_orders} ->
//! render`), wires it to the `tokio`-backed reactor, and fires a final
//! barrier once the whole graph has terminated. Stands in for the HTTP
//! request/response cycle the original `udho::activities` engine serves.
//! Routing, parsing and templating are all out of scope (spec.md §1), so
//! this binary just drives the DAG directly from `main`.

use std::sync::Arc;
use std::time::Duration;

use webact_context::config::EngineConfig;
use webact_context::Context;
use webact_core::{Activity, ActivityCore, Collector, FinalBarrierBuilder, Reactor, Starter, Subtask};
use webact_reactor::TokioReactor;

#[derive(Debug, Clone, Default)]
struct User {
    id: u64,
    name: String,
}

#[derive(Default)]
struct FetchUser {
    core: ActivityCore<FetchUser>,
}
#[async_trait::async_trait]
impl Activity for FetchUser {
    type Success = User;
    type Failure = String;
    fn core(&self) -> &ActivityCore<Self> {
        &self.core
    }
    async fn run(&self) -> Result<User, String> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(User { id: 7, name: "ada".to_string() })
    }
}

/// `required(false)`: a failed orders lookup shouldn't take down the page,
/// it should just render with an empty order list (spec.md scenario 3).
#[derive(Default)]
struct FetchOrders {
    core: ActivityCore<FetchOrders>,
}
#[async_trait::async_trait]
impl Activity for FetchOrders {
    type Success = Vec<u32>;
    type Failure = String;
    fn core(&self) -> &ActivityCore<Self> {
        &self.core
    }
    async fn run(&self) -> Result<Vec<u32>, String> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Err("orders service unavailable".to_string())
    }
}

struct Render {
    core: ActivityCore<Render>,
    collector: Arc<Collector<Context>>,
}
#[async_trait::async_trait]
impl Activity for Render {
    type Success = String;
    type Failure = String;
    fn core(&self) -> &ActivityCore<Self> {
        &self.core
    }
    async fn run(&self) -> Result<String, String> {
        let user = self.collector.success::<FetchUser>();
        let orders = self.collector.success::<FetchOrders>();
        Ok(format!("<h1>{}</h1><p>{} order(s)</p>", user.name, orders.len()))
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    webact_context::config::init_dotenv();
    let config = EngineConfig::from_env();
    log::info!("starting webact-cli demo (reactor_workers={})", config.reactor_workers);

    let ctx = Context::new();
    ctx.info("building activity graph");

    let collector = Arc::new(
        Collector::builder(ctx.clone())
            .with::<FetchUser>()
            .with::<FetchOrders>()
            .with::<Render>()
            .build(),
    );
    let reactor: Arc<dyn Reactor> = Arc::new(TokioReactor::new());
    let starter = Starter::with(collector.clone());

    let fetch_user = Subtask::with(collector.clone(), FetchUser::default(), reactor.clone());
    let fetch_orders = Subtask::with(collector.clone(), FetchOrders::default(), reactor.clone());
    fetch_orders.required(false);
    let render = Subtask::with(
        collector.clone(),
        Render { core: ActivityCore::new(), collector: collector.clone() },
        reactor.clone(),
    );
    render.after(&fetch_user);
    render.after(&fetch_orders);

    starter.done(&fetch_user);
    starter.done(&fetch_orders);

    let barrier = FinalBarrierBuilder::new(collector.clone(), reactor.clone()).watch(&render).exec({
        let ctx = ctx.clone();
        move |accessor| {
            if accessor.okay::<Render>() {
                ctx.info(&format!("render complete: {}", accessor.success::<Render>()));
            } else {
                ctx.error("render did not complete successfully");
            }
        }
    });

    starter.exec();

    // The barrier callback is posted to the reactor; give the demo binary
    // a moment for the whole graph (and the barrier) to drain before
    // exiting. A real server would keep running and never need this.
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(barrier);
}
