//! Online spam detector with a dynamic vocabulary.
//!
//! Mirrors the behaviour of a count-vectorizer capped at the most frequent
//! tokens feeding a logistic model fitted by stochastic gradient descent.
//! Every new labelled example triggers a full refit over all accumulated
//! data, so the vocabulary tracks spam tactics as they evolve.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

const MAX_FEATURES: usize = 50;
const EPOCHS: usize = 50;
const LEARNING_RATE: f64 = 0.1;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Spam detector with dynamic vocabulary and full retraining.
pub struct SpamDetector {
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    weights: Vec<f64>,
    bias: f64,
    trained: bool,
    emails: Vec<String>,
    labels: Vec<bool>,
    last_trained: Option<DateTime<Utc>>,
    rng: StdRng,
}

impl SpamDetector {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    /// Detector with an explicit SGD shuffle seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            vocabulary: Vec::new(),
            index: HashMap::new(),
            weights: Vec::new(),
            bias: 0.0,
            trained: false,
            emails: Vec::new(),
            labels: Vec::new(),
            last_trained: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Whether the model has been fitted at least once.
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Number of labelled emails accumulated so far.
    pub fn total_emails(&self) -> usize {
        self.emails.len()
    }

    /// UTC timestamp of the most recent (re)fit.
    pub fn last_trained(&self) -> Option<DateTime<Utc>> {
        self.last_trained
    }

    /// Seed the model with an initial labelled batch and fit it.
    ///
    /// Replaces any previously accumulated history.
    pub fn initial_training(&mut self, emails: Vec<String>, labels: Vec<bool>) {
        self.emails = emails;
        self.labels = labels;
        self.refit();
    }

    /// Record one new labelled email and refit over all accumulated data.
    pub fn learn(&mut self, email: &str, label: bool) {
        self.emails.push(email.to_string());
        self.labels.push(label);
        self.refit();
    }

    /// Classify an email.
    ///
    /// Returns the predicted label (`true` = spam) and a confidence in
    /// `[0.5, 1.0]`. An untrained model answers not-spam at confidence 0.5.
    pub fn predict(&self, email: &str) -> (bool, f64) {
        if !self.trained {
            return (false, 0.5);
        }

        let features = self.featurize(email);
        let p = sigmoid(self.decision(&features));
        (p >= 0.5, p.max(1.0 - p))
    }

    /// Plain accuracy of the current model over a labelled batch.
    pub fn evaluate(&self, emails: &[String], labels: &[bool]) -> f64 {
        if emails.is_empty() {
            return 0.0;
        }

        let correct = emails
            .iter()
            .zip(labels)
            .filter(|(email, &label)| self.predict(email).0 == label)
            .count();
        correct as f64 / emails.len() as f64
    }

    /// Rebuild the vocabulary and refit the model over all accumulated data.
    fn refit(&mut self) {
        if self.emails.is_empty() {
            return;
        }

        self.rebuild_vocabulary();

        let samples: Vec<Vec<f64>> = self.emails.iter().map(|e| self.featurize(e)).collect();

        self.weights = vec![0.0; self.vocabulary.len()];
        self.bias = 0.0;

        let mut order: Vec<usize> = (0..samples.len()).collect();
        for _ in 0..EPOCHS {
            order.shuffle(&mut self.rng);
            for &i in &order {
                let p = sigmoid(self.decision(&samples[i]));
                let gradient = p - if self.labels[i] { 1.0 } else { 0.0 };
                for (weight, &x) in self.weights.iter_mut().zip(&samples[i]) {
                    *weight -= LEARNING_RATE * gradient * x;
                }
                self.bias -= LEARNING_RATE * gradient;
            }
        }

        self.trained = true;
        self.last_trained = Some(Utc::now());
        tracing::debug!(
            vocabulary = self.vocabulary.len(),
            samples = self.emails.len(),
            "spam model refitted"
        );
    }

    /// Keep the most frequent tokens across all accumulated emails, capped
    /// at the feature budget. Ties break alphabetically for determinism.
    fn rebuild_vocabulary(&mut self) {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for email in &self.emails {
            for token in email.split_whitespace() {
                *counts.entry(token).or_insert(0) += 1;
            }
        }

        let mut tokens: Vec<(&str, usize)> = counts.into_iter().collect();
        tokens.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tokens.truncate(MAX_FEATURES);

        self.vocabulary = tokens.into_iter().map(|(t, _)| t.to_string()).collect();
        self.index = self
            .vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
    }

    /// Bag-of-words counts over the current vocabulary.
    fn featurize(&self, email: &str) -> Vec<f64> {
        let mut features = vec![0.0; self.vocabulary.len()];
        for token in email.split_whitespace() {
            if let Some(&i) = self.index.get(token) {
                features[i] += 1.0;
            }
        }
        features
    }

    fn decision(&self, features: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }
}

impl Default for SpamDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::EmailGenerator;

    fn labelled_batch(seed: u64, n: usize, day: u32) -> (Vec<String>, Vec<bool>) {
        let mut gen = EmailGenerator::with_seed(seed);
        let mut emails = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);
        for _ in 0..n {
            let (email, label) = gen.generate(day);
            emails.push(email);
            labels.push(label);
        }
        (emails, labels)
    }

    #[test]
    fn untrained_model_answers_not_spam_at_half_confidence() {
        let detector = SpamDetector::with_seed(0);
        assert_eq!(detector.predict("win free money"), (false, 0.5));
    }

    #[test]
    fn learns_to_separate_synthetic_spam_from_ham() {
        let (emails, labels) = labelled_batch(11, 300, 0);
        let mut detector = SpamDetector::with_seed(0);
        detector.initial_training(emails, labels);
        assert!(detector.is_trained());

        let (test_emails, test_labels) = labelled_batch(99, 100, 0);
        let accuracy = detector.evaluate(&test_emails, &test_labels);
        assert!(accuracy > 0.85, "accuracy was {accuracy}");
    }

    #[test]
    fn confident_on_obvious_spam_after_training() {
        let (emails, labels) = labelled_batch(5, 300, 0);
        let mut detector = SpamDetector::with_seed(0);
        detector.initial_training(emails, labels);

        let (label, confidence) = detector.predict("win free money click buy");
        assert!(label);
        assert!(confidence > 0.5);

        let (label, _) = detector.predict("meeting project report team work");
        assert!(!label);
    }

    #[test]
    fn learn_appends_and_refits() {
        let mut detector = SpamDetector::with_seed(0);
        assert_eq!(detector.total_emails(), 0);
        assert!(detector.last_trained().is_none());

        detector.learn("win free money", true);
        assert_eq!(detector.total_emails(), 1);
        assert!(detector.is_trained());
        assert!(detector.last_trained().is_some());
    }

    #[test]
    fn vocabulary_is_capped_at_feature_budget() {
        let mut detector = SpamDetector::with_seed(0);
        let emails: Vec<String> = (0..200).map(|i| format!("token{i} filler")).collect();
        let labels = vec![false; emails.len()];
        detector.initial_training(emails, labels);

        assert!(detector.vocabulary.len() <= MAX_FEATURES);
    }

    #[test]
    fn picks_up_new_spam_vocabulary_after_shift() {
        let (emails, labels) = labelled_batch(21, 200, 0);
        let mut detector = SpamDetector::with_seed(0);
        detector.initial_training(emails, labels);

        let mut gen = EmailGenerator::with_seed(77);
        for _ in 0..200 {
            let (email, label) = gen.generate(25);
            detector.learn(&email, label);
        }

        let (label, _) = detector.predict("prize offer deal discount work");
        assert!(label);
    }

    #[test]
    fn evaluate_on_empty_batch_is_zero() {
        let detector = SpamDetector::with_seed(0);
        assert_eq!(detector.evaluate(&[], &[]), 0.0);
    }
}
