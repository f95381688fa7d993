use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One-shot timer. The shell waits for the requested duration and resolves
/// the operation; the core turns that into an event. Cancellation is handled
/// in the core by ignoring stale completions, so the shell never needs to
/// tear a timer down early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayOperation {
    Start { millis: u64 },
}

impl Operation for DelayOperation {
    type Output = DelayOutput;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayOutput {
    Elapsed,
}

pub struct Delay<E> {
    context: CapabilityContext<DelayOperation, E>,
}

impl<Ev> Capability<Ev> for Delay<Ev> {
    type Operation = DelayOperation;
    type MappedSelf<MappedEv> = Delay<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + Copy + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Delay::new(self.context.map_event(f))
    }
}

impl<E> Delay<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<DelayOperation, E>) -> Self {
        Self { context }
    }

    pub fn start<F>(&self, duration: Duration, make_event: F)
    where
        F: FnOnce(DelayOutput) -> E + Send + 'static,
    {
        let millis = duration.as_millis() as u64;
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(DelayOperation::Start { millis })
                .await;
            context.update_app(make_event(output));
        });
    }
}
