//! Eviction Listener Module
//!
//! Caller supplied hook invoked whenever an entry leaves the cache or has
//! its value replaced.

// == Eviction Listener ==
/// Receives every key/value pair the cache drops or overwrites.
///
/// The hook runs inline, inside the call that triggered it. It has no
/// access to the cache that invoked it and must not try to reach it
/// through a shared handle either.
///
/// Any `FnMut(&K, &V) + Send` closure is a listener.
pub trait EvictionListener<K, V>: Send {
    fn on_evict(&mut self, key: &K, value: &V);
}

impl<K, V, F> EvictionListener<K, V> for F
where
    F: FnMut(&K, &V) + Send,
{
    fn on_evict(&mut self, key: &K, value: &V) {
        self(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<(u32, String)>);

    impl EvictionListener<u32, String> for Recorder {
        fn on_evict(&mut self, key: &u32, value: &String) {
            self.0.push((*key, value.clone()));
        }
    }

    #[test]
    fn test_closure_is_listener() {
        let mut count = 0;
        {
            let mut listener = |_: &u32, _: &String| count += 1;
            listener.on_evict(&1, &"a".to_string());
            listener.on_evict(&2, &"b".to_string());
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_struct_listener() {
        let mut recorder = Recorder(Vec::new());
        recorder.on_evict(&7, &"seven".to_string());
        assert_eq!(recorder.0, vec![(7, "seven".to_string())]);
    }
}
