// src/players/lookahead.rs

//! The recursive best-response search behind [`Player::predict`].
//!
//! A player weighing a candidate forecast asks every later player, in index
//! order, what it would submit given the market so far, adds that answer
//! to the hypothetical aggregate, and finally scores the candidate against
//! the blended outcome. Later players answer with their own strategy, so
//! the search is a backward induction over the rest of the round.
//!
//! Answers are cached for the lifetime of one `predict` call. Every cache
//! key uses the exact bits of the floats involved, so a cached answer is
//! always the answer the direct recursion would have produced.

use super::player::Player;
use super::strategy::Strategy;
use crate::scoring::outcome_blend;
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ResponseKey {
    index: usize,
    prefix: u64,
    belief: u64,
    nested: bool,
}

pub(crate) struct Lookahead<'a> {
    players: &'a [Player],
    responses: HashMap<ResponseKey, f64>,
    // (first later index, market bits) -> market after everyone from there on has moved
    settled: HashMap<(usize, u64), f64>,
}

impl<'a> Lookahead<'a> {
    pub(crate) fn new(players: &'a [Player]) -> Self {
        Self {
            players,
            responses: HashMap::new(),
            settled: HashMap::new(),
        }
    }

    pub(crate) fn cached_responses(&self) -> usize {
        self.responses.len()
    }

    /// Forecast of the player actually on the move.
    pub(crate) fn decide(&mut self, player: &Player, prefix: f64) -> f64 {
        self.solve(player, prefix, player.belief, false)
    }

    /// Hypothetical forecast of `players[index]` if it held `belief` and the
    /// players before it had contributed `prefix` to the market.
    fn respond(&mut self, index: usize, prefix: f64, belief: f64, nested: bool) -> f64 {
        let key = ResponseKey {
            index,
            prefix: prefix.to_bits(),
            belief: belief.to_bits(),
            nested,
        };
        if let Some(&forecast) = self.responses.get(&key) {
            return forecast;
        }
        let players = self.players;
        let forecast = self.solve(&players[index], prefix, belief, nested);
        self.responses.insert(key, forecast);
        forecast
    }

    fn solve(&mut self, player: &Player, prefix: f64, belief: f64, nested: bool) -> f64 {
        match player.strategy {
            Strategy::PerfectInformation => self.perfect(player, prefix, belief),
            Strategy::BoundedInformation { radius } => {
                self.bounded(player, prefix, belief, radius, nested)
            }
            Strategy::Naive => self.naive(player, prefix, belief),
        }
    }

    // --- PerfectInformation ---

    fn perfect(&mut self, player: &Player, prefix: f64, belief: f64) -> f64 {
        let domain = player.domain();
        let best = self.first_maximum(domain.full_range(), |this, i| {
            let market = this.settle(player.index + 1, prefix + player.weight * domain.get(i));
            player
                .rule
                .score_at(domain.logs(), i, outcome_blend(market, belief))
        });
        domain.get(best)
    }

    /// Market aggregate once every player from `from` onwards has answered
    /// with its true belief.
    fn settle(&mut self, from: usize, market: f64) -> f64 {
        let players = self.players;
        let Some(next) = players.get(from) else {
            return market;
        };
        let key = (from, market.to_bits());
        if let Some(&settled) = self.settled.get(&key) {
            return settled;
        }
        let forecast = self.respond(from, market, next.belief, true);
        let settled = self.settle(from + 1, market + next.weight * forecast);
        self.settled.insert(key, settled);
        settled
    }

    // --- BoundedInformation ---

    fn bounded(
        &mut self,
        player: &Player,
        prefix: f64,
        belief: f64,
        radius: usize,
        nested: bool,
    ) -> f64 {
        let domain = player.domain();
        // Inside someone else's search only forecasts near the belief are tried.
        // A zero radius leaves nothing to hedge, so the full grid stays open.
        let window = if nested && radius > 0 {
            domain.neighborhood(belief, radius)
        } else {
            domain.full_range()
        };
        let best = self.first_maximum(window, |this, i| {
            let market = prefix + player.weight * domain.get(i);
            this.hedge(player, i, belief, radius, player.index + 1, market)
        });
        domain.get(best)
    }

    /// Best score `player` can reach with its `candidate` forecast when every
    /// later player's belief is only known to within `radius` grid steps.
    fn hedge(
        &mut self,
        player: &Player,
        candidate: usize,
        belief: f64,
        radius: usize,
        from: usize,
        market: f64,
    ) -> f64 {
        let players = self.players;
        let Some(next) = players.get(from) else {
            return player
                .rule
                .score_at(player.domain().logs(), candidate, outcome_blend(market, belief));
        };
        let probes = next.domain().neighborhood(next.belief, radius);
        let mut best = f64::NEG_INFINITY;
        for probe in probes {
            let substituted = next.domain().get(probe);
            let forecast = self.respond(from, market, substituted, true);
            let score = self.hedge(
                player,
                candidate,
                belief,
                radius,
                from + 1,
                market + next.weight * forecast,
            );
            if score > best {
                best = score;
            }
        }
        best
    }

    // --- Naive ---

    fn naive(&mut self, player: &Player, prefix: f64, belief: f64) -> f64 {
        let players = self.players;
        let later = &players[player.index + 1..];
        let domain = player.domain();
        let best = self.first_maximum(domain.full_range(), |_, i| {
            let forecast = domain.get(i);
            let market = later
                .iter()
                .fold(prefix + player.weight * forecast, |market, other| {
                    market + other.weight * forecast
                });
            player
                .rule
                .score_at(domain.logs(), i, outcome_blend(market, belief))
        });
        domain.get(best)
    }

    /// Index of the first candidate with the highest score. Later candidates
    /// with an equal score never replace the leader.
    fn first_maximum<F>(&mut self, candidates: Range<usize>, mut score: F) -> usize
    where
        F: FnMut(&mut Self, usize) -> f64,
    {
        let mut best = candidates.start;
        let mut best_score = None;
        for i in candidates {
            let s = score(self, i);
            match best_score {
                Some(top) if s <= top => {}
                _ => {
                    best = i;
                    best_score = Some(s);
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ForecastDomain;
    use crate::scoring::ScoringRule;
    use std::sync::Arc;

    fn roster(
        beliefs: &[f64],
        weights: &[f64],
        rule: ScoringRule,
        strategy: Strategy,
        step: f64,
    ) -> Vec<Player> {
        let domain = Arc::new(ForecastDomain::with_step(step).unwrap());
        beliefs
            .iter()
            .zip(weights)
            .enumerate()
            .map(|(i, (&b, &w))| Player::new(i, w, rule, b, domain.clone(), strategy))
            .collect()
    }

    // Plain backward induction with no caching at all, for every strategy.
    fn uncached(players: &[Player], index: usize, prefix: f64, belief: f64, nested: bool) -> f64 {
        let player = &players[index];
        let domain = player.domain();
        let window = match player.strategy {
            Strategy::BoundedInformation { radius } if nested && radius > 0 => {
                domain.neighborhood(belief, radius)
            }
            _ => domain.full_range(),
        };
        let mut best = domain.get(window.start);
        let mut best_score: Option<f64> = None;
        for i in window {
            let candidate = domain.get(i);
            let market = prefix + player.weight * candidate;
            let score = match player.strategy {
                Strategy::PerfectInformation => {
                    let mut market = market;
                    for j in index + 1..players.len() {
                        let later = &players[j];
                        market += later.weight * uncached(players, j, market, later.belief, true);
                    }
                    player.rule.score(candidate, outcome_blend(market, belief))
                }
                Strategy::BoundedInformation { radius } => {
                    uncached_hedge(players, player, candidate, belief, radius, index + 1, market)
                }
                Strategy::Naive => {
                    let market = players[index + 1..]
                        .iter()
                        .fold(market, |market, other| market + other.weight * candidate);
                    player.rule.score(candidate, outcome_blend(market, belief))
                }
            };
            if best_score.map_or(true, |top| score > top) {
                best = candidate;
                best_score = Some(score);
            }
        }
        best
    }

    // Max over every combination of substituted beliefs for the later players.
    fn uncached_hedge(
        players: &[Player],
        player: &Player,
        candidate: f64,
        belief: f64,
        radius: usize,
        from: usize,
        market: f64,
    ) -> f64 {
        let Some(next) = players.get(from) else {
            return player.rule.score(candidate, outcome_blend(market, belief));
        };
        next.domain()
            .neighborhood(next.belief, radius)
            .map(|probe| {
                let substituted = next.domain().get(probe);
                let forecast = uncached(players, from, market, substituted, true);
                let market = market + next.weight * forecast;
                uncached_hedge(players, player, candidate, belief, radius, from + 1, market)
            })
            .fold(f64::NEG_INFINITY, f64::max)
    }

    #[test]
    fn cached_search_matches_plain_recursion() {
        let third = 1.0 / 3.0;
        for rule in ScoringRule::ALL {
            for beliefs in [[0.2, 0.5, 0.9], [0.7, 0.7, 0.1], [0.0, 1.0, 0.45]] {
                let players = roster(
                    &beliefs,
                    &[third, third, third],
                    rule,
                    Strategy::PerfectInformation,
                    0.1,
                );
                for index in 0..players.len() {
                    let prefix = 0.05 * index as f64;
                    let expected = uncached(&players, index, prefix, beliefs[index], false);
                    let got = Lookahead::new(&players).decide(&players[index], prefix);
                    assert_eq!(got, expected, "{rule} beliefs={beliefs:?} index={index}");
                }
            }
        }
    }

    #[test]
    fn cached_search_matches_plain_recursion_for_mixed_rosters() {
        let strategies = [
            Strategy::PerfectInformation,
            Strategy::BoundedInformation { radius: 0 },
            Strategy::BoundedInformation { radius: 1 },
            Strategy::Naive,
        ];
        let domain = Arc::new(ForecastDomain::with_step(0.1).unwrap());
        let beliefs = [0.3, 0.62, 0.85];
        let weights = [0.4, 0.3, 0.3];

        let mut checked = 0;
        for rule in ScoringRule::ALL {
            for a in strategies {
                for b in strategies {
                    for c in strategies {
                        let players: Vec<Player> = [a, b, c]
                            .into_iter()
                            .enumerate()
                            .map(|(i, strategy)| {
                                let d = domain.clone();
                                Player::new(i, weights[i], rule, beliefs[i], d, strategy)
                            })
                            .collect();
                        for index in 0..players.len() {
                            let prefix = 0.05 * index as f64;
                            let expected = uncached(&players, index, prefix, beliefs[index], false);
                            let got = Lookahead::new(&players).decide(&players[index], prefix);
                            assert_eq!(got, expected, "{rule} {a} {b} {c} index={index}");
                            checked += 1;
                        }
                    }
                }
            }
        }
        assert_eq!(checked, 576);
    }

    #[test]
    fn last_player_best_responds_to_the_blend() {
        let players = roster(
            &[0.3, 0.8],
            &[0.5, 0.5],
            ScoringRule::SquaredError,
            Strategy::PerfectInformation,
            0.01,
        );
        let prefix = 0.15;
        let got = Lookahead::new(&players).decide(&players[1], prefix);

        let domain = players[1].domain();
        let mut best = domain.get(0);
        let mut best_score = f64::NEG_INFINITY;
        for &c in domain.values() {
            let s = ScoringRule::SquaredError.score(c, outcome_blend(prefix + 0.5 * c, 0.8));
            if s > best_score {
                best = c;
                best_score = s;
            }
        }
        assert_eq!(got, best);
    }

    #[test]
    fn ties_keep_the_lowest_forecast() {
        // Log rule against an interior outcome: forecasts 0 and 1 both score
        // -inf, and on a 0/1 grid they are the only options.
        let players = roster(
            &[0.5],
            &[1.0],
            ScoringRule::Logarithmic,
            Strategy::PerfectInformation,
            1.0,
        );
        assert_eq!(Lookahead::new(&players).decide(&players[0], 0.0), 0.0);
    }

    #[test]
    fn naive_assumes_everyone_copies_the_candidate() {
        let players = roster(
            &[0.6, 0.1, 0.1],
            &[0.4, 0.3, 0.3],
            ScoringRule::Brier,
            Strategy::Naive,
            0.05,
        );
        let got = Lookahead::new(&players).decide(&players[0], 0.0);

        let domain = players[0].domain();
        let mut best = 0.0;
        let mut best_score = f64::NEG_INFINITY;
        for &c in domain.values() {
            let market = 0.4 * c + 0.3 * c + 0.3 * c;
            let s = ScoringRule::Brier.score(c, outcome_blend(market, 0.6));
            if s > best_score {
                best = c;
                best_score = s;
            }
        }
        assert_eq!(got, best);
        // The later players' actual beliefs are irrelevant to a naive player.
        let mut others = players.clone();
        others[1].belief = 0.95;
        others[2].belief = 0.95;
        assert_eq!(Lookahead::new(&others).decide(&others[0], 0.0), got);
    }

    #[test]
    fn zero_radius_matches_perfect_information_on_rounded_beliefs() {
        // The first mover's own belief is on the grid; the later beliefs are
        // not, and a zero radius must snap them to their nearest grid point.
        for rule in ScoringRule::ALL {
            let bounded = roster(
                &[0.3, 0.434, 0.671],
                &[0.4, 0.3, 0.3],
                rule,
                Strategy::BoundedInformation { radius: 0 },
                0.1,
            );
            let perfect = roster(
                &[0.3, 0.4, 0.7],
                &[0.4, 0.3, 0.3],
                rule,
                Strategy::PerfectInformation,
                0.1,
            );
            for prefix in [0.0, 0.1, 0.25] {
                let b = Lookahead::new(&bounded).decide(&bounded[0], prefix);
                let p = Lookahead::new(&perfect).decide(&perfect[0], prefix);
                assert_eq!(b, p, "{rule}: prefix {prefix}");
            }
        }
    }

    #[test]
    fn wider_hedges_never_score_lower() {
        // With perfect-information players after the decider, each wider
        // neighborhood only adds scenarios, and radius 0 is the exact solve.
        let domain = Arc::new(ForecastDomain::with_step(0.1).unwrap());
        let perfect = Strategy::PerfectInformation;
        let players = vec![
            Player::new(
                0,
                0.4,
                ScoringRule::Brier,
                0.5,
                domain.clone(),
                Strategy::BoundedInformation { radius: 2 },
            ),
            Player::new(1, 0.3, ScoringRule::Brier, 0.3, domain.clone(), perfect),
            Player::new(2, 0.3, ScoringRule::Brier, 0.8, domain.clone(), perfect),
        ];
        let mut lookahead = Lookahead::new(&players);
        for i in domain.full_range() {
            let market = 0.4 * domain.get(i);
            let settled = lookahead.settle(1, market);
            let exact = ScoringRule::Brier.score(domain.get(i), outcome_blend(settled, 0.5));
            let r0 = lookahead.hedge(&players[0], i, 0.5, 0, 1, market);
            let r1 = lookahead.hedge(&players[0], i, 0.5, 1, 1, market);
            let r2 = lookahead.hedge(&players[0], i, 0.5, 2, 1, market);
            assert_eq!(r0, exact, "candidate {i}");
            assert!(r0 <= r1 && r1 <= r2, "candidate {i}: {r0} {r1} {r2}");
        }
    }

    #[test]
    fn nested_bounded_players_stay_near_their_belief() {
        let players = roster(
            &[0.5, 0.2],
            &[0.5, 0.5],
            ScoringRule::Brier,
            Strategy::BoundedInformation { radius: 1 },
            0.1,
        );
        let mut lookahead = Lookahead::new(&players);
        for &belief in &[0.0, 0.2, 0.5, 1.0] {
            let forecast = lookahead.respond(1, 0.25, belief, true);
            let window = players[1].domain().neighborhood(belief, 1);
            let lo = players[1].domain().get(window.start);
            let hi = players[1].domain().get(window.end - 1);
            assert!(forecast >= lo && forecast <= hi, "{forecast} outside [{lo}, {hi}]");
        }
    }
}
