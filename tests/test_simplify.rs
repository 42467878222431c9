use sigmasat::clause::ClauseStatus;
use sigmasat::cnf::Cnf;
use sigmasat::dimacs::{self, FAIL_EG, LONG_EG, SUCC_EG};
use sigmasat::engine::Engine;
use sigmasat::lit::Lit;
use sigmasat::model::{satisfied, ModelStack};
use sigmasat::occurs::OccurTable;
use sigmasat::options::SimpOptions;
use sigmasat::simplify::*;
use sigmasat::stats::{GStats, PassParams, Score};

#[cfg(test)]
mod tests {
    use super::*;

    use expect_test::expect;

    fn engine_with(opts: SimpOptions) -> Engine {
        Engine::new(SimpOptions {
            threads: 2,
            perf_report: false,
            ..opts
        })
        .unwrap()
    }

    fn engine() -> Engine {
        engine_with(SimpOptions::default())
    }

    fn lit(l: i32) -> Lit {
        Lit::from_dimacs(l)
    }

    fn lits(clause: &[i32]) -> Vec<Lit> {
        clause.iter().map(|&l| lit(l)).collect()
    }

    /// Arena with room to spare, so stages that append never need a regrow.
    fn roomy(clauses: &[&[i32]]) -> Cnf {
        let cnf = Cnf::allocate(32, 128);
        for c in clauses {
            cnf.new_clause(&lits(c));
        }
        cnf
    }

    fn live_dimacs(cnf: &Cnf) -> Vec<Vec<i32>> {
        cnf.live()
            .map(|(_, c)| c.lits().map(Lit::to_dimacs).collect())
            .collect()
    }

    fn table(engine: &Engine, cnf: &Cnf, num_vars: u32) -> OccurTable {
        let mut ot = OccurTable::new(num_vars);
        create_ot(engine, cnf, &mut ot);
        ot
    }

    fn brute_force(num_vars: u32, clauses: &[Vec<Lit>]) -> Option<Vec<bool>> {
        (0..1u32 << num_vars)
            .map(|mask| (0..num_vars).map(|v| mask >> v & 1 == 1).collect::<Vec<_>>())
            .find(|model| clauses.iter().all(|c| satisfied(c, model)))
    }

    #[test]
    fn scores_rank_cheap_variables_first() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[1, 3], &[-1, 2]]);
        let mut pv = PassParams::new(3);
        calc_var_scores(&engine, &cnf, None, &mut pv);
        let order: Vec<u32> = pv.scores.iter().map(|s| s.var).collect();
        assert_eq!(order, vec![2, 0, 1]);
        assert_eq!((pv.scores[1].pos, pv.scores[1].neg), (2, 1));

        let ot = table(&engine, &cnf, 3);
        let mut from_table = PassParams::new(3);
        calc_var_scores(&engine, &cnf, Some(&ot), &mut from_table);
        assert_eq!(from_table.scores, pv.scores);
        assert_eq!(histogram(&engine, &cnf, 3), vec![2, 1, 2, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn election_is_independent() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[1, 3], &[-1, 2]]);
        let ot = table(&engine, &cnf, 3);
        let mut pv = PassParams::new(3);
        calc_var_scores(&engine, &cnf, Some(&ot), &mut pv);
        assert_eq!(elect(engine.options(), &cnf, &ot, &mut pv), 2);
        assert_eq!(pv.p_vars(), vec![2, 1]);
        assert!(pv.is_elected(1) && pv.is_elected(2) && !pv.is_elected(0));
        assert_eq!(pv.num_pvs, 2);
    }

    #[test]
    fn election_respects_occurrence_limits() {
        let clauses: Vec<Vec<i32>> = (2..=13).map(|v| vec![1, v]).collect();
        let cnf = Cnf::from_dimacs(&clauses);
        let elect_first = |opts: SimpOptions, mu_inc: u32| {
            let engine = engine_with(opts);
            let ot = table(&engine, &cnf, 13);
            let mut pv = PassParams::new(13);
            pv.scores = vec![Score::new(0, 12, 0)];
            pv.mu_inc = mu_inc;
            elect(engine.options(), &cnf, &ot, &mut pv)
        };
        let mu = SimpOptions {
            mu_pos: 10,
            ..SimpOptions::default()
        };
        assert_eq!(elect_first(mu.clone(), 0), 0);
        assert_eq!(elect_first(mu.clone(), 1), 1);
        let capped = SimpOptions {
            ce_pos_limit: 11,
            ..mu
        };
        assert_eq!(elect_first(capped, 1), 0);
    }

    #[test]
    fn ve_replaces_clauses_by_resolvents() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[-1, 3]]);
        let ot = table(&engine, &cnf, 3);
        let mut pv = PassParams::new(3);
        pv.set_p_vars(&[0]);
        assert_eq!(calc_added(&engine, &cnf, &ot, &pv), (1, 2));

        let mut model = ModelStack::new();
        assert_eq!(ve(&engine, &cnf, &ot, &pv, &mut model), 1);
        assert_eq!(live_dimacs(&cnf), vec![vec![2, 3]]);
        assert_eq!(cnf.clause(2).status(), ClauseStatus::Original);
        let entries: Vec<(Lit, Vec<Lit>)> = model.iter().cloned().collect();
        assert_eq!(entries, vec![(lit(1), lits(&[1, 2])), (lit(-1), lits(&[-1, 3]))]);
        assert_eq!(reduce_ot(&engine, &cnf, &ot), 4);

        let mut m = vec![false, true, false];
        model.extend(&mut m);
        assert_eq!(m, vec![false, true, false]);
        let mut m = vec![false, false, true];
        model.extend(&mut m);
        assert_eq!(m, vec![true, false, true]);
    }

    #[test]
    fn ve_records_unit_resolvents() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[-1, 2]]);
        let ot = table(&engine, &cnf, 2);
        let mut pv = PassParams::new(2);
        pv.set_p_vars(&[0]);
        let mut model = ModelStack::new();
        assert_eq!(ve(&engine, &cnf, &ot, &pv, &mut model), 1);
        assert_eq!(pv.units(), vec![lit(2)]);
        assert_eq!(live_dimacs(&cnf), vec![vec![2]]);
    }

    #[test]
    fn ve_keeps_empty_resolvent_pairs() {
        let engine = engine();
        let cnf = roomy(&[&[1], &[-1]]);
        let ot = table(&engine, &cnf, 1);
        let mut pv = PassParams::new(1);
        pv.set_p_vars(&[0]);
        let mut model = ModelStack::new();
        assert_eq!(calc_added(&engine, &cnf, &ot, &pv), (0, 0));
        assert_eq!(ve(&engine, &cnf, &ot, &pv, &mut model), 0);
        assert!(model.is_empty());
        assert_eq!(live_dimacs(&cnf), vec![vec![1], vec![-1]]);
    }

    #[test]
    fn ve_rejects_growth() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[1, 3], &[1, 4], &[-1, 5], &[-1, 6], &[-1, 7]]);
        let ot = table(&engine, &cnf, 7);
        let mut pv = PassParams::new(7);
        pv.set_p_vars(&[0]);
        let mut model = ModelStack::new();
        assert_eq!(calc_added(&engine, &cnf, &ot, &pv), (0, 0));
        assert_eq!(ve(&engine, &cnf, &ot, &pv, &mut model), 0);
        assert_eq!(cnf.live().count(), 6);
    }

    #[test]
    fn ve_eliminates_pure_variables() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[1, -3], &[2, 3]]);
        let ot = table(&engine, &cnf, 3);
        let mut pv = PassParams::new(3);
        pv.set_p_vars(&[0]);
        let mut model = ModelStack::new();
        assert_eq!(ve(&engine, &cnf, &ot, &pv, &mut model), 1);
        assert_eq!(live_dimacs(&cnf), vec![vec![2, 3]]);
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn hse_subsumes_and_strengthens() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[1, 2, 3], &[-1, 2, 4]]);
        let ot = table(&engine, &cnf, 4);
        let mut pv = PassParams::new(4);
        pv.set_p_vars(&[0]);
        let counts = hse(&engine, &cnf, &ot, &pv);
        assert_eq!(
            counts,
            HseCounts {
                subsumed: 1,
                strengthened: 1
            }
        );
        assert_eq!(live_dimacs(&cnf), vec![vec![1, 2], vec![2, 4]]);
        assert!(ot.to_vec(lit(-1)).is_empty());
        assert_eq!(cnf.clause(2).sig(), lit(2).hash_bit() | lit(4).hash_bit());
    }

    #[test]
    fn hse_promotes_learnt_subsumer() {
        let engine = engine();
        let cnf = Cnf::allocate(4, 16);
        cnf.new_clause_with(&lits(&[1, 2]), ClauseStatus::Learnt);
        cnf.new_clause(&lits(&[1, 2, 3]));
        let ot = table(&engine, &cnf, 3);
        let mut pv = PassParams::new(3);
        pv.set_p_vars(&[0]);
        assert_eq!(hse(&engine, &cnf, &ot, &pv).subsumed, 1);
        assert_eq!(cnf.clause(0).status(), ClauseStatus::Original);
        assert!(cnf.clause(1).molten());
    }

    #[test]
    fn hse_skips_heavy_variables() {
        let engine = engine_with(SimpOptions {
            hse_in_limit: 4,
            ..SimpOptions::default()
        });
        let cnf = roomy(&[&[1, 2], &[1, 2, 3]]);
        let ot = table(&engine, &cnf, 3);
        let mut pv = PassParams::new(3);
        pv.set_p_vars(&[0]);
        assert_eq!(hse(&engine, &cnf, &ot, &pv), HseCounts::default());
    }

    #[test]
    fn hse_leaves_binaries_whole() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[-1, 2]]);
        let ot = table(&engine, &cnf, 2);
        let mut pv = PassParams::new(2);
        pv.set_p_vars(&[0]);
        assert_eq!(hse(&engine, &cnf, &ot, &pv), HseCounts::default());
        assert_eq!(live_dimacs(&cnf), vec![vec![1, 2], vec![-1, 2]]);
        assert_eq!(ot.to_vec(lit(-1)), vec![1]);
    }

    #[test]
    fn bce_removes_blocked_clauses() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[-1, -2]]);
        let ot = table(&engine, &cnf, 2);
        let mut pv = PassParams::new(2);
        pv.set_p_vars(&[0]);
        let mut model = ModelStack::new();
        assert_eq!(bce(&engine, &cnf, &ot, &pv, &mut model), 2);
        assert!(live_dimacs(&cnf).is_empty());

        let mut m = vec![false, false];
        model.extend(&mut m);
        assert!(satisfied(&lits(&[1, 2]), &m) && satisfied(&lits(&[-1, -2]), &m));
    }

    #[test]
    fn bce_keeps_resolvable_clauses() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[-1, 3]]);
        let ot = table(&engine, &cnf, 3);
        let mut pv = PassParams::new(3);
        pv.set_p_vars(&[0]);
        let mut model = ModelStack::new();
        assert_eq!(bce(&engine, &cnf, &ot, &pv, &mut model), 0);
        assert!(model.is_empty());
    }

    #[test]
    fn bce_fan_limit() {
        let engine = engine_with(SimpOptions {
            fan_limit: 1,
            ..SimpOptions::default()
        });
        let cnf = roomy(&[&[1, 2], &[1, 3], &[-1, -2]]);
        let ot = table(&engine, &cnf, 3);
        let mut pv = PassParams::new(3);
        pv.set_p_vars(&[0]);
        let mut model = ModelStack::new();
        assert_eq!(bce(&engine, &cnf, &ot, &pv, &mut model), 0);
    }

    #[test]
    fn hre_removes_hidden_tautologies() {
        let engine = engine();
        let cnf = roomy(&[&[1, 3], &[1, 5], &[-5, 3]]);
        let ot = table(&engine, &cnf, 5);
        let mut pv = PassParams::new(5);
        pv.set_p_vars(&[0]);
        assert_eq!(hre(&engine, &cnf, &ot, &pv), 1);
        assert!(cnf.clause(0).molten());
        assert_eq!(live_dimacs(&cnf), vec![vec![1, 5], vec![3, -5]]);
    }

    #[test]
    fn hre_ignores_binaries_of_other_candidates() {
        let engine = engine();
        let cnf = roomy(&[&[1, 3], &[1, 5], &[-5, 3]]);
        let ot = table(&engine, &cnf, 5);
        let mut pv = PassParams::new(5);
        pv.set_p_vars(&[0, 4]);
        assert_eq!(hre(&engine, &cnf, &ot, &pv), 0);
    }

    #[test]
    fn counting() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[-1, 3], &[4]]);
        cnf.clause(2).melt();
        let mut gstats = GStats::new(5);
        eval_reds(&engine, &cnf, &mut gstats);
        assert_eq!((gstats.num_clauses, gstats.num_lits, gstats.num_del_vars), (2, 4, 2));

        cnf.clause(0).mark_deleted();
        count_cls(&engine, &cnf, &mut gstats);
        count_lits(&engine, &cnf, &mut gstats);
        count_del_vars(&engine, &cnf, &mut gstats);
        assert_eq!((gstats.num_clauses, gstats.num_lits, gstats.num_del_vars), (1, 2, 3));
    }

    #[test]
    fn unit_clauses_are_collected() {
        let engine = engine();
        let cnf = roomy(&[&[1, 2], &[-3], &[2], &[-3]]);
        let pv = PassParams::new(3);
        assert_eq!(collect_units(&engine, &cnf, &pv), 3);
        let mut units = pv.units();
        units.sort();
        assert_eq!(units, lits(&[2, -3]));
        assert_eq!(live_dimacs(&cnf), vec![vec![1, 2]]);
    }

    #[test]
    fn single_elimination_report() {
        let engine = engine_with(SimpOptions {
            min_pvars: 1,
            phases: 1,
            ..SimpOptions::default()
        });
        let mut simp = Simplifier::new(&engine, Cnf::from_dimacs(&[vec![1, 2], vec![-1, 3]]), 3);
        let report = simp.simplify().clone();
        assert_eq!(
            report,
            SimpReport {
                phases: 1,
                rounds: 1,
                eliminated: 1,
                clauses_before: 2,
                lits_before: 4,
                clauses_after: 1,
                lits_after: 2,
                del_vars: 1,
                ..SimpReport::default()
            }
        );
        expect![[r#"
            c | phases: 1 (1 rounds)
            c | clauses: 2 -> 1
            c | literals: 4 -> 2
            c | eliminated variables: 1
            c | removed variables: 1
            c | subsumed: 0, strengthened: 0
            c | blocked: 0, hidden: 0
            c | units: 0
        "#]]
        .assert_eq(&report.to_string());
        assert_eq!(live_dimacs(simp.cnf()), vec![vec![2, 3]]);
        assert_eq!(simp.model().len(), 2);
        assert_eq!(simp.params().mu_inc, 1);
    }

    #[test]
    fn too_few_candidates_stops_early() {
        let engine = engine_with(SimpOptions {
            min_pvars: 3,
            ..SimpOptions::default()
        });
        let mut simp = Simplifier::new(&engine, Cnf::from_dimacs(&[vec![1, 2], vec![-1, -2]]), 2);
        let report = simp.simplify();
        assert_eq!((report.phases, report.rounds), (0, 0));
        assert_eq!((report.clauses_after, report.lits_after), (2, 4));
    }

    #[test]
    fn zero_phases_only_collects_units() {
        let engine = engine_with(SimpOptions {
            phases: 0,
            ..SimpOptions::default()
        });
        let mut simp = Simplifier::new(&engine, Cnf::from_dimacs(&[vec![1, 2], vec![-2]]), 2);
        assert_eq!(simp.simplify().units, 1);
        let (cnf, units, model) = simp.into_parts();
        assert_eq!(units, vec![lit(-2)]);
        assert_eq!(live_dimacs(&cnf), vec![vec![1, 2]]);
        assert!(model.is_empty());
    }

    fn check_builtin(text: &str, opts: SimpOptions) {
        let problem = dimacs::read_string(text).unwrap();
        let original: Vec<Vec<Lit>> = problem.clauses.iter().map(|c| lits(c)).collect();
        let engine = engine_with(opts);
        let mut simp = Simplifier::new(&engine, problem.to_cnf(), problem.num_vars);
        simp.simplify();
        let (cnf, units, model) = simp.into_parts();
        let mut remaining: Vec<Vec<Lit>> = cnf.live().map(|(_, c)| c.to_vec()).collect();
        remaining.extend(units.iter().map(|&u| vec![u]));

        let before = brute_force(problem.num_vars, &original);
        let after = brute_force(problem.num_vars, &remaining);
        assert_eq!(before.is_some(), after.is_some(), "{text}");
        if let Some(mut m) = after {
            model.extend(&mut m);
            assert!(original.iter().all(|c| satisfied(c, &m)), "{text}");
        }
    }

    #[test]
    fn builtin_formulas_keep_their_answer() {
        for text in [FAIL_EG, LONG_EG, SUCC_EG] {
            check_builtin(
                text,
                SimpOptions {
                    min_pvars: 1,
                    ..SimpOptions::default()
                },
            );
            check_builtin(
                text,
                SimpOptions {
                    all: true,
                    min_pvars: 1,
                    phases: 3,
                    ..SimpOptions::default()
                },
            );
        }
    }
}
