use std::sync::Arc;

use stratum_reflect::{Facet, WireValue};

use crate::context::Context;
use crate::error::EngineError;

// -----------------------------------------------------------------------------
// EventSubscriber

/// A lifecycle listener over the four traversal events: pre/post serialize
/// and pre/post deserialize, each fired once per call, not per field.
/// Override the events of interest; the defaults are no-ops, so one
/// subscriber can cover several events.
///
/// Subscribers run in registration order and their errors propagate to the
/// caller unwrapped. A subscriber must not change the context's group set
/// mid-traversal; field inclusion is undefined if it does.
pub trait EventSubscriber: Send + Sync {
    /// Observes the root value before traversal begins.
    fn pre_serialize(&self, _value: &dyn Facet, _ctx: &Context) -> Result<(), EngineError> {
        Ok(())
    }

    /// May reshape the produced wire tree, e.g. inject computed fields.
    fn post_serialize(&self, _output: &mut WireValue, _ctx: &Context) -> Result<(), EngineError> {
        Ok(())
    }

    /// May massage the incoming wire tree before population.
    fn pre_deserialize(&self, _input: &mut WireValue, _ctx: &Context) -> Result<(), EngineError> {
        Ok(())
    }

    /// May touch the populated object after traversal.
    fn post_deserialize(&self, _object: &mut dyn Facet, _ctx: &Context) -> Result<(), EngineError> {
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ListenerRegistry

/// The ordered list of lifecycle subscribers, fixed at engine-build time.
#[derive(Default)]
pub struct ListenerRegistry {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.push(subscriber);
    }

    pub(crate) fn pre_serialize(
        &self,
        value: &dyn Facet,
        ctx: &Context,
    ) -> Result<(), EngineError> {
        for subscriber in &self.subscribers {
            subscriber.pre_serialize(value, ctx)?;
        }
        Ok(())
    }

    pub(crate) fn post_serialize(
        &self,
        output: &mut WireValue,
        ctx: &Context,
    ) -> Result<(), EngineError> {
        for subscriber in &self.subscribers {
            subscriber.post_serialize(output, ctx)?;
        }
        Ok(())
    }

    pub(crate) fn pre_deserialize(
        &self,
        input: &mut WireValue,
        ctx: &Context,
    ) -> Result<(), EngineError> {
        for subscriber in &self.subscribers {
            subscriber.pre_deserialize(input, ctx)?;
        }
        Ok(())
    }

    pub(crate) fn post_deserialize(
        &self,
        object: &mut dyn Facet,
        ctx: &Context,
    ) -> Result<(), EngineError> {
        for subscriber in &self.subscribers {
            subscriber.post_deserialize(object, ctx)?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use stratum_reflect::WireValue;

    use super::{EventSubscriber, ListenerRegistry};
    use crate::context::Context;
    use crate::error::EngineError;

    struct Stamp {
        order: Arc<AtomicUsize>,
        key: &'static str,
    }

    impl EventSubscriber for Stamp {
        fn post_serialize(
            &self,
            output: &mut WireValue,
            _: &Context,
        ) -> Result<(), EngineError> {
            let position = self.order.fetch_add(1, Ordering::SeqCst);
            if let WireValue::Object(map) = output {
                map.insert(self.key.to_owned(), position.into());
            }
            Ok(())
        }
    }

    #[test]
    fn subscribers_fire_in_registration_order() {
        let order = Arc::new(AtomicUsize::new(0));
        let mut registry = ListenerRegistry::new();
        registry.subscribe(Arc::new(Stamp {
            order: order.clone(),
            key: "first",
        }));
        registry.subscribe(Arc::new(Stamp {
            order: order.clone(),
            key: "second",
        }));

        let mut output = WireValue::Object(serde_json::Map::new());
        registry.post_serialize(&mut output, &Context::new()).unwrap();

        assert_eq!(output["first"], 0);
        assert_eq!(output["second"], 1);
    }
}
