//! Event bus behaviour as seen by listeners.

use std::sync::{Arc, Mutex};

use modulith::{DispatchError, Event, EventBus, HandlerError, Listener};

struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Listener for Recorder {
    fn on_event(&self, event: &mut Event) -> Result<(), HandlerError> {
        self.log.lock().unwrap().push(self.name);
        let hops = event.get_as::<u32>("hops").unwrap_or(0);
        event.set("hops", hops + 1);
        Ok(())
    }
}

fn recorder(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<dyn Listener> {
    Arc::new(Recorder {
        name,
        log: log.clone(),
    })
}

#[test]
fn listeners_share_one_mutable_event() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut events = EventBus::new();
    events.subscribe("orders.placed", "audit", recorder("audit", &log));
    events.subscribe("orders.placed", "mailer", recorder("mailer", &log));

    let event = events
        .dispatch(Event::new("orders.placed", "orders").with("order", "o-1"))
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["audit", "mailer"]);
    assert_eq!(event.get_as::<u32>("hops"), Some(2));
    assert_eq!(event.get_as::<String>("order").as_deref(), Some("o-1"));
    assert_eq!(event.fired_by(), "orders");
}

#[test]
fn stopping_propagation_in_the_middle() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut events = EventBus::new();
    events.subscribe("e", "first", recorder("first", &log));
    events.on("e", |event: &mut Event| {
        event.stop_propagation();
        Ok(())
    });
    events.subscribe("e", "never", recorder("never", &log));

    let event = events.dispatch(Event::new("e", "tests")).unwrap();
    assert!(event.is_propagation_stopped());
    assert_eq!(*log.lock().unwrap(), vec!["first"]);
}

#[test]
fn failing_listener_reports_position() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut events = EventBus::new();
    events.on("e", |_: &mut Event| Err(HandlerError::Unauthorized("nope".into())));
    events.subscribe("e", "after", recorder("after", &log));

    match events.dispatch(Event::new("e", "tests")) {
        Err(DispatchError::ListenerFailed { event, position, source }) => {
            assert_eq!(event, "e");
            assert_eq!(position, 0);
            assert_eq!(source.status_code(), 401);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn definitions_list_ids_per_event() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut events = EventBus::new();
    events.subscribe("a", "one", recorder("one", &log));
    events.subscribe("a", "two", recorder("two", &log));

    let defs = serde_json::to_value(events.listeners_definition()).unwrap();
    assert_eq!(
        defs,
        serde_json::json!([{ "event": "a", "listeners": ["one", "two"] }])
    );
}
