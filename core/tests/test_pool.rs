// Buffer arena coverage: cap enforcement with clean undo, reuse, accounting
// conservation, idempotent dispose.

#[cfg(test)]
mod tests {
    use cryptainer_core::pool::{ArenaLimits, BufferArena, PoolError};

    fn arena(max_count: usize, max_bytes: usize) -> BufferArena {
        BufferArena::new(ArenaLimits {
            max_count,
            max_bytes,
        })
    }

    #[test]
    fn rent_returns_zeroed_buffer_of_requested_length() {
        let arena = arena(4, 4096);
        let buf = arena.rent(100).unwrap();

        assert_eq!(buf.len(), 100);
        assert!(buf.iter().all(|&b| b == 0));
        assert_eq!(arena.live_count(), 1);
        assert_eq!(arena.live_bytes(), 100);
    }

    #[test]
    fn drop_recycles_and_accounting_returns_to_zero() {
        let arena = arena(4, 4096);
        {
            let _a = arena.rent(100).unwrap();
            let _b = arena.rent(200).unwrap();
            assert_eq!(arena.live_count(), 2);
            assert_eq!(arena.live_bytes(), 300);
        }
        assert_eq!(arena.live_count(), 0);
        assert_eq!(arena.live_bytes(), 0);
    }

    #[test]
    fn recycled_buffer_is_reused_and_rezeroed() {
        let arena = arena(4, 4096);
        {
            let mut buf = arena.rent(128).unwrap();
            buf[0] = 0xFF;
        }
        // The recycled buffer comes back, scrubbed to zero at rent.
        let buf = arena.rent(64).unwrap();
        assert_eq!(buf.len(), 64);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn count_cap_is_a_hard_error_with_clean_undo() {
        let arena = arena(2, 4096);
        let _a = arena.rent(10).unwrap();
        let _b = arena.rent(10).unwrap();

        let err = arena.rent(10).unwrap_err();
        assert!(matches!(err, PoolError::CapacityExceeded { .. }));

        // Failed rent leaves the accounting untouched.
        assert_eq!(arena.live_count(), 2);
        assert_eq!(arena.live_bytes(), 20);

        drop(_a);
        assert!(arena.rent(10).is_ok());
    }

    #[test]
    fn byte_cap_is_a_hard_error_with_clean_undo() {
        let arena = arena(8, 256);
        let _a = arena.rent(200).unwrap();

        let err = arena.rent(100).unwrap_err();
        assert!(matches!(
            err,
            PoolError::CapacityExceeded { requested: 100, .. }
        ));
        assert_eq!(arena.live_count(), 1);
        assert_eq!(arena.live_bytes(), 200);
    }

    #[test]
    fn truncate_keeps_accounting_symmetric() {
        let arena = arena(4, 4096);
        {
            let mut buf = arena.rent(300).unwrap();
            buf.truncate(5);
            assert_eq!(buf.len(), 5);
            // The charge stays at the rented size until the handle drops.
            assert_eq!(arena.live_bytes(), 300);
        }
        assert_eq!(arena.live_bytes(), 0);
    }

    #[test]
    fn dispose_is_idempotent() {
        let arena = arena(4, 4096);
        drop(arena.rent(64).unwrap());

        arena.dispose();
        arena.dispose();
        assert_eq!(arena.live_count(), 0);
        assert_eq!(arena.live_bytes(), 0);
    }

    #[test]
    fn handle_outliving_dispose_still_balances() {
        let arena = arena(4, 4096);
        let buf = arena.rent(64).unwrap();

        arena.dispose();
        assert_eq!(arena.live_count(), 1);

        drop(buf);
        assert_eq!(arena.live_count(), 0);
        assert_eq!(arena.live_bytes(), 0);
    }

    #[test]
    fn concurrent_rent_recycle_balances() {
        let arena = arena(64, 64 * 1024);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        let mut buf = arena.rent(512).unwrap();
                        buf[0] = 1;
                    }
                });
            }
        });

        assert_eq!(arena.live_count(), 0);
        assert_eq!(arena.live_bytes(), 0);
    }
}
