//! Reference scoring engine.
//!
//! Scores a gene set by how many patients carry exactly one of its genes,
//! compared against independent mutation of each gene. The p-value is a
//! binomial tail, optionally refined by a permutation test. This engine lets
//! the driver run end to end; it does not implement the exact test.

use std::collections::HashMap;

use comet_core::errors::ErrorInfo;
use comet_core::{CometError, IndexedMutations, ScoreMethod, WeightFunction};
use tracing::debug;

use crate::context::ComputationContext;
use crate::engine::{EnumeratedSet, RawRow, RawSample, SampleRequest, SamplingEngine};
use crate::exhaustive::INVALID_PROBABILITY;
use crate::records::ChainTable;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SetScore {
    p_value: f64,
    method: ScoreMethod,
}

#[derive(Debug, Clone, Copy)]
struct ScoreRule {
    co_occurrence_cutoff: usize,
    hybrid_pval_threshold: f64,
}

/// Metropolis-Hastings sampler over gene-set collections with an
/// exclusivity score.
#[derive(Debug, Clone)]
pub struct ExclusivityEngine {
    weight_function: WeightFunction,
    permutations: usize,
    cache: HashMap<Vec<usize>, SetScore>,
}

impl ExclusivityEngine {
    /// Creates an engine using the binomial score with permutation refinement.
    pub fn new(permutations: usize) -> Self {
        Self {
            weight_function: WeightFunction::Binomial,
            permutations: permutations.max(1),
            cache: HashMap::new(),
        }
    }

    /// Number of cached set scores.
    pub fn cached_scores(&self) -> usize {
        self.cache.len()
    }

    fn score(
        &mut self,
        ctx: &mut ComputationContext,
        data: &IndexedMutations,
        genes: &[usize],
        rule: ScoreRule,
    ) -> Result<SetScore, CometError> {
        let mut key = genes.to_vec();
        key.sort_unstable();
        if let Some(score) = self.cache.get(&key) {
            return Ok(*score);
        }
        let (exclusive, co_occurring) = exclusivity_counts(data, &key);
        let score = match self.weight_function {
            WeightFunction::Permutation => SetScore {
                p_value: permutation_pvalue(ctx, data, &key, exclusive, self.permutations),
                method: ScoreMethod::Permutation,
            },
            WeightFunction::Binomial | WeightFunction::Exact => {
                let q = exclusivity_probability(data, &key);
                let p_value = binomial_tail(ctx, data.num_patients(), q, exclusive)?;
                if co_occurring <= rule.co_occurrence_cutoff && p_value < rule.hybrid_pval_threshold
                {
                    SetScore {
                        p_value: permutation_pvalue(ctx, data, &key, exclusive, self.permutations),
                        method: ScoreMethod::Permutation,
                    }
                } else {
                    SetScore {
                        p_value,
                        method: ScoreMethod::Binomial,
                    }
                }
            }
        };
        self.cache.insert(key, score);
        Ok(score)
    }
}

impl Default for ExclusivityEngine {
    fn default() -> Self {
        Self::new(1_000)
    }
}

/// Weight of a p-value under an amplifier: `-amplifier * ln(p)`.
pub fn weight_of(p_value: f64, amplifier: u32) -> f64 {
    (f64::from(amplifier) * p_value.clamp(f64::MIN_POSITIVE, 1.0).ln()).abs()
}

impl SamplingEngine for ExclusivityEngine {
    fn sample(
        &mut self,
        ctx: &mut ComputationContext,
        request: &SampleRequest<'_>,
    ) -> Result<Vec<RawSample>, CometError> {
        let data = request.data;
        let sizes = request.gene_set_sizes;
        let total: usize = sizes.iter().sum();
        let genes = data.num_genes();
        if sizes.is_empty() || total > genes {
            return Err(CometError::Engine(
                ErrorInfo::new("sample-size", "collection must be non-empty and fit in the gene universe")
                    .with_context("genes", genes.to_string())
                    .with_context("requested", total.to_string()),
            ));
        }
        let step = request.step_length.max(1);
        let rule = ScoreRule {
            co_occurrence_cutoff: request.co_occurrence_cutoff,
            hybrid_pval_threshold: request.hybrid_pval_threshold,
        };

        let mut slots = if request.initial_solution.is_empty() {
            random_start(ctx, data, sizes)?
        } else {
            split_start(data, sizes, request.initial_solution)?
        };
        let mut scores = Vec::with_capacity(slots.len());
        for slot in &slots {
            scores.push(self.score(ctx, data, slot, rule)?);
        }

        let mut samples = Vec::with_capacity((request.iterations / step) as usize);
        let mut accepted = 0u64;
        for iteration in 0..request.iterations {
            let slot = ctx.rng_mut().below(slots.len());
            if !slots[slot].is_empty() && genes > slots[slot].len() {
                let position = ctx.rng_mut().below(slots[slot].len());
                let incoming = loop {
                    let candidate = ctx.rng_mut().below(genes);
                    if !slots[slot].contains(&candidate) {
                        break candidate;
                    }
                };
                let outgoing = slots[slot][position];
                let partner = slots.iter().position(|members| members.contains(&incoming));

                let mut proposal = slots[slot].clone();
                proposal[position] = incoming;
                let partner_proposal = partner.map(|other| {
                    let mut members = slots[other].clone();
                    if let Some(at) = members.iter().position(|&gene| gene == incoming) {
                        members[at] = outgoing;
                    }
                    (other, members)
                });

                let valid = respects_subtypes(&proposal, data.subtype_count)
                    && partner_proposal
                        .as_ref()
                        .map_or(true, |(_, members)| respects_subtypes(members, data.subtype_count));
                if valid {
                    let new_score = self.score(ctx, data, &proposal, rule)?;
                    let mut delta = weight_of(new_score.p_value, request.amplifier)
                        - weight_of(scores[slot].p_value, request.amplifier);
                    let partner_score = match &partner_proposal {
                        Some((other, members)) => {
                            let score = self.score(ctx, data, members, rule)?;
                            delta += weight_of(score.p_value, request.amplifier)
                                - weight_of(scores[*other].p_value, request.amplifier);
                            Some(score)
                        }
                        None => None,
                    };
                    if delta >= 0.0 || ctx.rng_mut().next_unit() < delta.exp() {
                        accepted += 1;
                        slots[slot] = proposal;
                        scores[slot] = new_score;
                        if let (Some((other, members)), Some(score)) =
                            (partner_proposal, partner_score)
                        {
                            slots[other] = members;
                            scores[other] = score;
                        }
                    }
                }
            }

            if (iteration + 1) % step == 0 {
                samples.push(RawSample {
                    rows: slots
                        .iter()
                        .zip(&scores)
                        .map(|(members, score)| {
                            let mut genes = members.clone();
                            genes.sort_unstable();
                            RawRow {
                                genes,
                                weight: weight_of(score.p_value, request.amplifier),
                                table_count: score.method.code(),
                            }
                        })
                        .collect(),
                });
            }
        }
        debug!(
            iterations = request.iterations,
            accepted,
            samples = samples.len(),
            cached = self.cache.len(),
            "sampling call finished"
        );
        Ok(samples)
    }

    fn convergence_metric(
        &self,
        tables: &[ChainTable],
        samples_per_chain: u64,
    ) -> Result<f64, CometError> {
        if samples_per_chain == 0 {
            return Ok(1.0);
        }
        let samples = samples_per_chain as f64;
        let mut worst: f64 = 0.0;
        for (index, a) in tables.iter().enumerate() {
            for b in &tables[index + 1..] {
                let mut difference = 0.0;
                for (key, record) in a {
                    let other = b.get(key).map_or(0, |record| record.frequency);
                    difference += (record.frequency as f64 - other as f64).abs();
                }
                for (key, record) in b {
                    if !a.contains_key(key) {
                        difference += record.frequency as f64;
                    }
                }
                worst = worst.max(0.5 * difference / samples);
            }
        }
        Ok(worst)
    }

    fn set_weight_function(&mut self, function: WeightFunction) -> Result<(), CometError> {
        if function == WeightFunction::Exact {
            return Err(CometError::Engine(
                ErrorInfo::new("weight-function-unsupported", "the reference engine has no exact test")
                    .with_hint("use the binomial or permutation weight function"),
            ));
        }
        if function != self.weight_function {
            self.cache.clear();
        }
        self.weight_function = function;
        Ok(())
    }

    fn load_precomputed_score(
        &mut self,
        probability: f64,
        set_size: usize,
        method: ScoreMethod,
        genes: &[usize],
    ) -> Result<(), CometError> {
        if genes.len() != set_size {
            return Err(CometError::Data(
                ErrorInfo::new("precomputed-size", "gene count does not match the set size")
                    .with_context("set_size", set_size.to_string())
                    .with_context("genes", genes.len().to_string()),
            ));
        }
        let mut key = genes.to_vec();
        key.sort_unstable();
        self.cache.insert(
            key,
            SetScore {
                p_value: probability,
                method,
            },
        );
        Ok(())
    }

    fn enumerate_exhaustive(
        &mut self,
        ctx: &mut ComputationContext,
        data: &IndexedMutations,
        set_size: usize,
        pval_threshold: f64,
    ) -> Result<Vec<EnumeratedSet>, CometError> {
        let genes = data.num_genes();
        if set_size == 0 || set_size > genes {
            return Err(CometError::Config(
                ErrorInfo::new("exhaustive-size", "set size must be between 1 and the gene count")
                    .with_context("set_size", set_size.to_string())
                    .with_context("genes", genes.to_string()),
            ));
        }
        let rule = ScoreRule {
            co_occurrence_cutoff: 0,
            hybrid_pval_threshold: 0.0,
        };
        let mut results = Vec::new();
        let mut combination: Vec<usize> = (0..set_size).collect();
        loop {
            let untestable = combination
                .iter()
                .any(|&gene| data.gene_case_counts[gene] == 0);
            let entry = if untestable {
                EnumeratedSet {
                    genes: combination.clone(),
                    weight: 0.0,
                    table_count: ScoreMethod::Binomial.code(),
                    probability: INVALID_PROBABILITY,
                }
            } else {
                let score = self.score(ctx, data, &combination, rule)?;
                EnumeratedSet {
                    genes: combination.clone(),
                    weight: weight_of(score.p_value, 1),
                    table_count: score.method.code(),
                    probability: if score.p_value > pval_threshold {
                        INVALID_PROBABILITY
                    } else {
                        score.p_value
                    },
                }
            };
            results.push(entry);
            if !next_combination(&mut combination, genes) {
                break;
            }
        }
        Ok(results)
    }
}

/// Counts patients with exactly one, and with two or more, mutated genes in
/// the set.
fn exclusivity_counts(data: &IndexedMutations, genes: &[usize]) -> (usize, usize) {
    let mut hits = vec![0u32; data.num_patients()];
    for &gene in genes {
        for &patient in &data.gene_cases[gene] {
            hits[patient] += 1;
        }
    }
    let exclusive = hits.iter().filter(|&&count| count == 1).count();
    let co_occurring = hits.iter().filter(|&&count| count > 1).count();
    (exclusive, co_occurring)
}

/// Probability that a patient carries exactly one gene of the set when genes
/// mutate independently at their observed frequencies.
fn exclusivity_probability(data: &IndexedMutations, genes: &[usize]) -> f64 {
    let n = data.num_patients().max(1) as f64;
    let frequencies: Vec<f64> = genes
        .iter()
        .map(|&gene| data.gene_case_counts[gene] as f64 / n)
        .collect();
    frequencies
        .iter()
        .enumerate()
        .map(|(index, &f)| {
            let others: f64 = frequencies
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != index)
                .map(|(_, &g)| 1.0 - g)
                .product();
            f * others
        })
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// `P(X >= observed)` for `X ~ Binomial(trials, q)`.
fn binomial_tail(
    ctx: &ComputationContext,
    trials: usize,
    q: f64,
    observed: usize,
) -> Result<f64, CometError> {
    if observed == 0 {
        return Ok(1.0);
    }
    if observed > trials || q <= 0.0 {
        return Ok(0.0);
    }
    if q >= 1.0 {
        return Ok(1.0);
    }
    let (ln_q, ln_not_q) = (q.ln(), (1.0 - q).ln());
    let mut tail = 0.0;
    for k in observed..=trials {
        let ln_term = ctx.ln_choose(trials, k)? + k as f64 * ln_q + (trials - k) as f64 * ln_not_q;
        tail += ln_term.exp();
    }
    Ok(tail.min(1.0))
}

/// Permutation p-value: each gene's cases are redrawn uniformly over
/// patients and the exclusive count is compared with the observed one.
fn permutation_pvalue(
    ctx: &mut ComputationContext,
    data: &IndexedMutations,
    genes: &[usize],
    observed: usize,
    rounds: usize,
) -> f64 {
    let patients = data.num_patients();
    let mut at_least = 0usize;
    let mut hits = vec![0u32; patients];
    for _ in 0..rounds {
        hits.iter_mut().for_each(|count| *count = 0);
        for &gene in genes {
            let cases = data.gene_case_counts[gene].min(patients);
            for patient in ctx.rng_mut().distinct_indices(patients, cases) {
                hits[patient] += 1;
            }
        }
        if hits.iter().filter(|&&count| count == 1).count() >= observed {
            at_least += 1;
        }
    }
    (at_least + 1) as f64 / (rounds + 1) as f64
}

fn respects_subtypes(genes: &[usize], subtype_count: usize) -> bool {
    genes.iter().filter(|&&gene| gene < subtype_count).count() <= 1
}

fn random_start(
    ctx: &mut ComputationContext,
    data: &IndexedMutations,
    sizes: &[usize],
) -> Result<Vec<Vec<usize>>, CometError> {
    let genes = data.num_genes();
    let order = ctx.rng_mut().distinct_indices(genes, genes);
    let mut slots: Vec<Vec<usize>> = sizes.iter().map(|&size| Vec::with_capacity(size)).collect();
    if sizes.iter().all(|&size| size == 0) {
        return Ok(slots);
    }
    for gene in order {
        let target = slots.iter().enumerate().position(|(slot, members)| {
            members.len() < sizes[slot]
                && (gene >= data.subtype_count
                    || members.iter().all(|&member| member >= data.subtype_count))
        });
        if let Some(slot) = target {
            slots[slot].push(gene);
        }
        if slots.iter().zip(sizes).all(|(members, &size)| members.len() == size) {
            return Ok(slots);
        }
    }
    Err(CometError::Engine(
        ErrorInfo::new("random-start", "could not fill every slot with a valid random start")
            .with_context("subtypes", data.subtype_count.to_string()),
    ))
}

fn split_start(
    data: &IndexedMutations,
    sizes: &[usize],
    initial: &[usize],
) -> Result<Vec<Vec<usize>>, CometError> {
    let total: usize = sizes.iter().sum();
    let mut distinct = initial.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    if initial.len() != total || distinct.len() != total {
        return Err(CometError::Engine(
            ErrorInfo::new("initial-solution", "initial solution must list sum(ks) distinct genes")
                .with_context("given", initial.len().to_string())
                .with_context("expected", total.to_string()),
        ));
    }
    if let Some(&gene) = initial.iter().find(|&&gene| gene >= data.num_genes()) {
        return Err(CometError::Engine(
            ErrorInfo::new("initial-solution", "initial gene index out of range")
                .with_context("index", gene.to_string()),
        ));
    }
    let mut slots = Vec::with_capacity(sizes.len());
    let mut offset = 0;
    for &size in sizes {
        slots.push(initial[offset..offset + size].to_vec());
        offset += size;
    }
    Ok(slots)
}

/// Advances `combination` to the next k-subset of `0..n` in lexicographic
/// order. Returns `false` after the last subset.
fn next_combination(combination: &mut [usize], n: usize) -> bool {
    let k = combination.len();
    for position in (0..k).rev() {
        if combination[position] < n - k + position {
            combination[position] += 1;
            for follower in position + 1..k {
                combination[follower] = combination[follower - 1] + 1;
            }
            return true;
        }
    }
    false
}
