//! End-to-end scenario 1: two parents both succeed, the child that depends
//! on both reads their combined payload.

use std::sync::Arc;

use webact_core::{Activity, ActivityCore, Collector, Subtask};
use webact_reactor::TokioReactor;

#[derive(Default)]
struct FetchA {
    core: ActivityCore<FetchA>,
}
#[async_trait::async_trait]
impl Activity for FetchA {
    type Success = u32;
    type Failure = String;
    fn core(&self) -> &ActivityCore<Self> {
        &self.core
    }
    async fn run(&self) -> Result<u32, String> {
        Ok(10)
    }
}

#[derive(Default)]
struct FetchB {
    core: ActivityCore<FetchB>,
}
#[async_trait::async_trait]
impl Activity for FetchB {
    type Success = u32;
    type Failure = String;
    fn core(&self) -> &ActivityCore<Self> {
        &self.core
    }
    async fn run(&self) -> Result<u32, String> {
        Ok(20)
    }
}

struct Sum {
    core: ActivityCore<Sum>,
    collector: Arc<Collector<()>>,
}
#[async_trait::async_trait]
impl Activity for Sum {
    type Success = u32;
    type Failure = String;
    fn core(&self) -> &ActivityCore<Self> {
        &self.core
    }
    async fn run(&self) -> Result<u32, String> {
        Ok(self.collector.success::<FetchA>() + self.collector.success::<FetchB>())
    }
}

#[tokio::test]
async fn two_parents_succeed_child_sums_their_payloads() {
    let collector =
        Arc::new(Collector::builder(()).with::<FetchA>().with::<FetchB>().with::<Sum>().build());
    let reactor: Arc<dyn webact_core::Reactor> = Arc::new(TokioReactor::new());

    let a = Subtask::with(collector.clone(), FetchA::default(), reactor.clone());
    let b = Subtask::with(collector.clone(), FetchB::default(), reactor.clone());
    let sum = Subtask::with(
        collector.clone(),
        Sum { core: ActivityCore::new(), collector: collector.clone() },
        reactor.clone(),
    );
    sum.after(&a);
    sum.after(&b);

    a.start(reactor.clone());
    b.start(reactor.clone());

    for _ in 0..50 {
        if collector.completed::<Sum>() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert!(collector.okay::<FetchA>());
    assert!(collector.okay::<FetchB>());
    assert!(collector.okay::<Sum>());
    assert_eq!(collector.success::<Sum>(), 30);
}
