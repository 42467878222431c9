use quickcheck_macros::*;
use sigmasat::options::{RestartOptions, RestartPolicy};
use sigmasat::restart::{luby_term, Ema, LbdRestart, LubyRestart, Restarts};

#[quickcheck]
fn qc_luby_matches_closed_form(n: u8) -> bool {
    let n = n as u64 + 1;
    let mut luby = LubyRestart::default();
    luby.init(1, 0);
    let mut last = 0;
    for _ in 0..n {
        last = luby.next_luby();
    }
    last as u64 == luby_term(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    use expect_test::expect;

    fn triggers(luby: &mut LubyRestart, updates: usize) -> Vec<usize> {
        (1..=updates)
            .filter(|_| {
                luby.update();
                luby.restart()
            })
            .collect()
    }

    #[test]
    fn ema_window_one_tracks_input() {
        let mut e = Ema::new(1);
        e.update(3.0);
        assert_eq!(e.value(), 3.0);
        e.update(5.0);
        assert_eq!(e.value(), 5.0);
    }

    #[test]
    #[should_panic(expected = "EMA window must be positive")]
    fn ema_zero_window() {
        Ema::new(0);
    }

    #[test]
    fn luby_sequence() {
        let mut luby = LubyRestart::default();
        luby.init(1, 0);
        let terms: Vec<i64> = (0..15).map(|_| luby.next_luby()).collect();
        expect!["[1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8]"].assert_eq(&format!("{terms:?}"));
        let closed: Vec<u64> = (1..=15).map(luby_term).collect();
        assert_eq!(terms.iter().map(|&t| t as u64).collect::<Vec<_>>(), closed);
    }

    #[test]
    fn luby_restart_schedule() {
        let mut luby = LubyRestart::default();
        luby.init(1, 0);
        expect!["[1, 2, 3, 5, 6, 7, 9, 13, 14, 15, 17, 18, 19, 21, 25]"]
            .assert_eq(&format!("{:?}", triggers(&mut luby, 30)));
    }

    #[test]
    fn pending_restart_holds_countdown() {
        let mut luby = LubyRestart::default();
        luby.init(3, 0);
        for _ in 0..3 {
            luby.update();
        }
        for _ in 0..5 {
            luby.update();
        }
        assert!(luby.restart());
        assert!(!luby.restart());
        assert_eq!(triggers(&mut luby, 3), vec![3]);
    }

    #[test]
    fn disabled_luby_never_fires() {
        let mut luby = LubyRestart::default();
        luby.init(1, 0);
        luby.disable();
        assert!(triggers(&mut luby, 50).is_empty());
    }

    #[test]
    fn luby_limit_resets_sequence() {
        let mut luby = LubyRestart::default();
        luby.init(1, 2);
        let terms: Vec<i64> = (0..8).map(|_| luby.next_luby()).collect();
        assert_eq!(terms, vec![1; 8]);
        assert!(!luby.limit_reached());
    }

    #[test]
    fn lbd_restart_fires_on_rising_quality() {
        let mut lbd = LbdRestart::default();
        lbd.init(1.1, 2, 4);
        lbd.reset();
        let fired: Vec<bool> = [5.0, 10.0, 20.0, 40.0]
            .into_iter()
            .map(|x| {
                lbd.update(x);
                lbd.restart()
            })
            .collect();
        assert_eq!(fired, vec![false, false, false, true]);
        assert_eq!((lbd.fast(), lbd.slow()), (26.875, 20.3125));

        lbd.swap();
        assert_eq!((lbd.fast(), lbd.slow()), (0.0, 0.0));
        lbd.reset();
        assert!(lbd.restart());
    }

    #[test]
    #[should_panic(expected = "LBD restart used before init")]
    fn lbd_restart_needs_init() {
        LbdRestart::default().reset();
    }

    #[test]
    fn luby_policy_from_options() {
        let opts = RestartOptions {
            policy: RestartPolicy::Luby,
            luby_factor: 2,
            ..RestartOptions::default()
        };
        let mut r = Restarts::new(&opts).unwrap();
        assert!(matches!(r, Restarts::Luby(_)));
        r.update(7);
        assert!(!r.restart());
        r.update(7);
        assert!(r.restart());
        assert!(!r.restart());
    }

    #[test]
    fn ema_policy_from_options() {
        let mut r = Restarts::new(&RestartOptions::default()).unwrap();
        assert!(matches!(r, Restarts::Ema(_)));
        r.update(4);
        assert!(!r.restart());
    }

    #[test]
    fn invalid_rate_rejected() {
        let opts = RestartOptions {
            lbd_rate: 10.0,
            ..RestartOptions::default()
        };
        let err = Restarts::new(&opts).unwrap_err();
        expect![[r#"maximum value exceeded for option "lbd-rate" (10 > 10)"#]].assert_eq(&err.to_string());
    }
}
