mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use common::{fork, inc, settle_now};
use deferred::{ap, Computation};

fn leaf<T: deferred::Value>(value: T) -> Computation<String, T> {
    Computation::new(move |_, resolve| resolve.resolve(value.clone()))
}

fn failing_leaf<T: deferred::Value>(error: &str) -> Computation<String, T> {
    let error = error.to_owned();
    Computation::new(move |reject, _| reject.reject(error.clone()))
}

mod map {
    use super::*;

    #[test]
    fn transforms_the_success_value() {
        assert_eq!(settle_now(&leaf(1).map(inc)), Ok(2));
        assert_eq!(settle_now(&Computation::<(), i32>::succeed(1).map(inc)), Ok(2));
    }

    #[test]
    fn is_applied_right_away_on_an_eager_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let mapped = Computation::<(), i32>::succeed(1).map(move |x| {
            counted.fetch_add(1, Ordering::SeqCst);
            x + 1
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(mapped.settled(), Some(Ok(2)));
    }

    #[test]
    fn is_deferred_on_a_leaf() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let mapped = leaf(1).map(move |x| {
            counted.fetch_add(1, Ordering::SeqCst);
            x + 1
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(mapped.settled(), None);
        assert_eq!(settle_now(&mapped), Ok(2));
        assert_eq!(settle_now(&mapped), Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn skips_failures() {
        let called = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&called);
        let mapped = Computation::<&str, i32>::fail("someRejection").map(move |x| {
            counted.fetch_add(1, Ordering::SeqCst);
            x + 1
        });
        assert_eq!(settle_now(&mapped), Err("someRejection"));
        assert_eq!(settle_now(&failing_leaf::<i32>("late").map(inc)), Err("late".to_owned()));
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn identity_law() {
        for computation in [leaf(5), Computation::succeed(5)] {
            assert_eq!(settle_now(&computation.clone().map(|x| x)), settle_now(&computation));
        }
    }

    #[test]
    fn composition_law() {
        let double = |x: i32| x * 2;
        for computation in [leaf(5), Computation::succeed(5)] {
            let nested = computation.clone().map(inc).map(double);
            let composed = computation.map(move |x| double(inc(x)));
            assert_eq!(settle_now(&nested), settle_now(&composed));
        }
    }

    #[test]
    fn derived_chains_are_independent() {
        let original = leaf(0).map(inc);
        let plus2 = original.clone().map(inc);
        let plus3 = original.clone().map(inc).map(inc);
        assert_eq!(settle_now(&plus2), Ok(2));
        assert_eq!(settle_now(&plus3), Ok(3));
        assert_eq!(settle_now(&original), Ok(1));
        assert_eq!(settle_now(&plus2), Ok(2));
    }
}

mod chain {
    use super::*;

    #[test]
    fn continues_with_the_returned_computation() {
        let chained = Computation::<(), i32>::succeed(1).chain(|x| Computation::succeed(x + 1));
        assert_eq!(settle_now(&chained), Ok(2));
    }

    #[test]
    fn returned_failures_propagate() {
        let chained = leaf("input").chain(|v| Computation::<String, i32>::fail(format!("error from {v}")));
        assert_eq!(settle_now(&chained), Err("error from input".to_owned()));
    }

    #[test]
    fn skips_failures() {
        let rejected = leaf(1).chain(|v| Computation::<String, i32>::fail((v + 1).to_string()));
        let result = rejected.chain(|x| Computation::succeed(x + 1));
        assert_eq!(settle_now(&result), Err("2".to_owned()));
        assert!(Computation::<i32, i32>::fail(1)
            .chain(|x| Computation::succeed(x))
            .settled()
            .is_some());
    }

    #[test]
    fn runs_at_fork_time_on_an_eager_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let chained = Computation::<(), i32>::succeed(1).chain(move |x| {
            counted.fetch_add(1, Ordering::SeqCst);
            Computation::succeed(x + 1)
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(settle_now(&chained), Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn eager_steps_in_the_middle_of_a_sequence() {
        let rejected = Computation::<&str, &str>::fail("an err");
        let asked = Computation::succeed("resolved1").chain(move |_| rejected.clone());
        let twice = Computation::succeed("resolved2").chain(move |_| asked.clone());
        let result = twice.map(|x| x);
        assert_eq!(settle_now(&result), Err("an err"));
    }

    #[test]
    fn returned_sequences_run_to_completion() {
        let chained = leaf(1).chain(|x| leaf(x).map(|x| x * 10).map(inc));
        assert_eq!(settle_now(&chained), Ok(11));
    }
}

mod reject_map {
    use super::*;

    #[test]
    fn leaves_successes_alone() {
        let called = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&called);
        let mapped = Computation::<i32, i32>::succeed(1).reject_map(move |e| {
            counted.fetch_add(1, Ordering::SeqCst);
            e + 1
        });
        assert_eq!(mapped.settled(), Some(Ok(1)));
        assert_eq!(settle_now(&mapped), Ok(1));

        let counted = Arc::clone(&called);
        let mapped = leaf(1).reject_map(move |e| {
            counted.fetch_add(1, Ordering::SeqCst);
            e.len()
        });
        assert_eq!(settle_now(&mapped), Ok(1));
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn transforms_the_failure_value() {
        let mapped = Computation::<i32, i32>::fail(1).reject_map(inc);
        assert_eq!(mapped.settled(), Some(Err(2)));
        let lengths = failing_leaf::<i32>("error").reject_map(|e| e.len());
        assert_eq!(settle_now(&lengths), Err(5));
    }

    #[test]
    fn changes_the_failure_type_between_steps() {
        let described = failing_leaf::<i32>("abc")
            .reject_map(|e| e.len())
            .map(inc)
            .reject_map(|n| n * 2)
            .reject_map(|n| format!("{n} chars"));
        assert_eq!(settle_now(&described), Err("6 chars".to_owned()));
    }
}

mod reject_chain {
    use super::*;

    #[test]
    fn leaves_successes_alone() {
        let recovered = Computation::<i32, i32>::succeed(1).reject_chain(|e| Computation::<i32, i32>::succeed(e + 1));
        assert_eq!(recovered.settled(), Some(Ok(1)));
    }

    #[test]
    fn chains_failures() {
        let chained = Computation::<i32, i32>::fail(1).reject_chain(|e| Computation::<i32, i32>::fail(e + 1));
        assert_eq!(settle_now(&chained), Err(2));
    }

    #[test]
    fn recovers_onto_the_success_channel() {
        let recovered = Computation::<i32, i32>::fail(1).reject_chain(|e| Computation::<(), i32>::succeed(e + 1));
        assert_eq!(settle_now(&recovered), Ok(2));
    }

    #[test]
    fn after_a_chain_that_succeeds() {
        let chained = Computation::<i32, i32>::succeed(1).chain(|x| Computation::succeed(x + 1));
        let recovered = chained.clone().reject_chain(|e| Computation::<i32, i32>::succeed(e + 100));
        assert_eq!(settle_now(&recovered), Ok(2));
        assert_eq!(settle_now(&chained), Ok(2));
    }
}

mod channels {
    use super::*;

    #[test]
    fn failure_passes_a_trailing_map_as_the_queue_empties() {
        let computation = failing_leaf::<i32>("late").reject_map(|e| format!("{e}!")).map(inc);
        assert_eq!(settle_now(&computation), Err("late!".to_owned()));

        let only_success_steps = failing_leaf::<i32>("late").map(inc).map(inc);
        assert_eq!(settle_now(&only_success_steps), Err("late".to_owned()));
    }

    #[test]
    fn success_passes_a_trailing_reject_map_as_the_queue_empties() {
        let computation = leaf(1).map(inc).reject_map(|e| e.len()).reject_map(|n| n + 1);
        assert_eq!(settle_now(&computation), Ok(2));
    }

    #[test]
    fn interleaved_steps_only_see_their_own_channel() {
        let computation = leaf(1)
            .reject_map(|e| format!("first {e}"))
            .chain(|x| Computation::<String, i32>::fail(format!("at {x}")))
            .map(|x| x * 100)
            .reject_map(|e| format!("{e}, mapped"))
            .map(|x| x * 1000)
            .reject_chain(|e| Computation::<usize, i32>::succeed(e.len() as i32))
            .map(inc);
        assert_eq!(settle_now(&computation), Ok("at 1, mapped".len() as i32 + 1));
    }
}

mod applicative {
    use super::*;

    type Inc = fn(i32) -> i32;

    #[test]
    fn applies_the_function_to_the_value() {
        let result = ap(Computation::<String, Inc>::succeed(inc), Computation::succeed(10));
        assert_eq!(result.settled(), Some(Ok(11)));

        let lazy = ap(leaf::<Inc>(inc), leaf(10));
        assert_eq!(settle_now(&lazy), Ok(11));
    }

    #[test]
    fn value_failure_wins() {
        let result = ap(Computation::<&str, Inc>::succeed(inc), Computation::fail("error"));
        assert_eq!(settle_now(&result), Err("error"));
    }

    #[test]
    fn function_failure_wins() {
        let result = ap(Computation::<&str, Inc>::fail("error"), Computation::succeed(1));
        assert_eq!(settle_now(&result), Err("error"));
    }

    #[test]
    fn first_failure_in_fork_order_wins_once() {
        let functions = Computation::<&str, Inc>::new(|reject, _| reject.reject("second"));
        let values = Computation::<&str, i32>::new(|reject, _| reject.reject("first"));
        let result = ap(functions, values);
        assert_eq!(fork(&result).calls(), vec![Err("first")]);
        assert_eq!(fork(&result).calls(), vec![Err("first")]);
    }

    #[test]
    fn starts_both_sides_before_either_settles() {
        let started = Arc::new(AtomicUsize::new(0));
        let (values_started, functions_started) = (Arc::clone(&started), Arc::clone(&started));
        let values = Computation::<(), i32>::new(move |_, _| {
            values_started.fetch_add(1, Ordering::SeqCst);
        });
        let functions = Computation::<(), Inc>::new(move |_, _| {
            functions_started.fetch_add(1, Ordering::SeqCst);
        });
        let forked = fork(&values.ap(functions));
        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert!(forked.calls().is_empty());
    }

    #[test]
    fn composes_inside_a_sequence() {
        let summed = leaf(2)
            .map(|x| x * 10)
            .ap(leaf(3).map(|y| move |x: i32| x + y))
            .map(inc);
        assert!(summed.settled().is_none());
        assert_eq!(settle_now(&summed), Ok(24));

        let product = leaf(4)
            .ap(leaf::<Inc>(inc))
            .chain(|x| leaf(x).ap(Computation::succeed(inc as Inc)));
        assert_eq!(settle_now(&product), Ok(6));
    }
}
