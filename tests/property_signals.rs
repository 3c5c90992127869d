use proptest::prelude::*;
use scripthook::events::{Signal, Subscription};

#[derive(Debug, Clone)]
enum Op {
    Subscribe,
    Fire(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Subscribe), any::<u8>().prop_map(Op::Fire)]
}

proptest! {
    /// Every subscriber observes exactly the values fired after it
    /// subscribed, in fire order, once each.
    #[test]
    fn subscribers_see_exactly_later_fires(ops in proptest::collection::vec(op_strategy(), 0..64)) {
        let signal: Signal<u8> = Signal::new();
        let mut subs: Vec<(Subscription<u8>, Vec<u8>)> = Vec::new();

        for op in ops {
            match op {
                Op::Subscribe => subs.push((signal.subscribe(), Vec::new())),
                Op::Fire(value) => {
                    signal.fire(value);
                    for (_, expected) in subs.iter_mut() {
                        expected.push(value);
                    }
                }
            }
        }

        for (mut sub, expected) in subs {
            let mut seen = Vec::new();
            while let Some(value) = sub.try_recv() {
                seen.push(value);
            }
            prop_assert_eq!(seen, expected);
        }
    }

    /// A subscription taken after all fires never sees a retired slot.
    #[test]
    fn late_subscription_sees_nothing(fires in proptest::collection::vec(any::<u8>(), 0..32)) {
        let signal: Signal<u8> = Signal::new();
        for value in fires {
            signal.fire(value);
        }
        let mut late = signal.subscribe();
        prop_assert_eq!(late.try_recv(), None);
    }
}
