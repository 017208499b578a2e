//! End-to-end scenario 3: same as the required-failure scenario but with
//! `required(false)`, the child still runs (P6).

use std::sync::Arc;

use webact_core::{Activity, ActivityCore, Collector, Subtask};
use webact_reactor::TokioReactor;

#[derive(Default)]
struct OptionalLookup {
    core: ActivityCore<OptionalLookup>,
}
#[async_trait::async_trait]
impl Activity for OptionalLookup {
    type Success = u32;
    type Failure = u32;
    fn core(&self) -> &ActivityCore<Self> {
        &self.core
    }
    async fn run(&self) -> Result<u32, u32> {
        Err(100)
    }
}

#[derive(Default)]
struct Render {
    core: ActivityCore<Render>,
}
#[async_trait::async_trait]
impl Activity for Render {
    type Success = String;
    type Failure = String;
    fn core(&self) -> &ActivityCore<Self> {
        &self.core
    }
    async fn run(&self) -> Result<String, String> {
        Ok("rendered".to_string())
    }
}

#[tokio::test]
async fn optional_failure_lets_child_run() {
    let collector = Arc::new(Collector::builder(()).with::<OptionalLookup>().with::<Render>().build());
    let reactor: Arc<dyn webact_core::Reactor> = Arc::new(TokioReactor::new());

    let lookup = Subtask::with(collector.clone(), OptionalLookup::default(), reactor.clone());
    lookup.required(false);
    let render = Subtask::with(collector.clone(), Render::default(), reactor.clone());
    render.after(&lookup);

    lookup.start(reactor.clone());

    for _ in 0..50 {
        if collector.completed::<Render>() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert!(collector.failed::<OptionalLookup>());
    assert!(collector.okay::<Render>());
}
