//! Breadth-first URL frontier with the visited set and page budget
//!
//! All mutation goes through `&mut self`; the engine keeps the frontier
//! behind one mutex so that dequeue, budget check and claim form a single
//! critical section.

use std::collections::{HashSet, VecDeque};

use crate::crawler::filter::FilterConfig;

/// Outcome of asking the frontier for work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pop {
    /// The URL is claimed: in flight until completed or released
    Fetch(String),

    /// The URL matched a skip rule. It is marked visited and uses budget.
    Skipped(String),

    /// Nothing to hand out now, but fetches in flight may still discover
    /// links or give budget back by failing
    Wait,

    /// Nothing left to do: budget spent, or queue empty with nothing in flight
    Done,
}

/// FIFO queue of pending URLs plus the URLs already visited, in flight or failed
///
/// Only successfully fetched and skipped URLs are visited and count toward
/// the page budget. In-flight URLs reserve budget until they finish; a
/// failed URL gives its reservation back and is never handed out again.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    in_flight: HashSet<String>,
    failed: HashSet<String>,
    max_pages: usize,
}

impl Frontier {
    /// Create a frontier holding only the seed
    pub fn new(seed: impl Into<String>, max_pages: usize) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            in_flight: HashSet::new(),
            failed: HashSet::new(),
            max_pages,
        };
        frontier.enqueue(seed.into());
        frontier
    }

    fn is_known(&self, url: &str) -> bool {
        self.visited.contains(url) || self.in_flight.contains(url) || self.failed.contains(url)
    }

    /// Queue a URL unless it was already visited, claimed, failed or queued
    pub fn enqueue(&mut self, url: String) -> bool {
        if self.is_known(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Take the next unit of work
    pub fn pop(&mut self, filter: &FilterConfig) -> Pop {
        loop {
            if self.budget_spent() {
                return Pop::Done;
            }
            if self.visited.len() + self.in_flight.len() >= self.max_pages {
                return Pop::Wait;
            }

            let Some(url) = self.queue.pop_front() else {
                return if self.in_flight.is_empty() {
                    Pop::Done
                } else {
                    Pop::Wait
                };
            };
            self.queued.remove(&url);

            if self.is_known(&url) {
                continue;
            }

            if filter.should_skip(&url) {
                self.visited.insert(url.clone());
                return Pop::Skipped(url);
            }

            self.in_flight.insert(url.clone());
            return Pop::Fetch(url);
        }
    }

    /// Mark a claimed URL visited and queue the in-scope links it discovered.
    /// Returns how many links were queued.
    pub fn complete<I>(&mut self, url: &str, links: I, filter: &FilterConfig) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        if self.in_flight.remove(url) {
            self.visited.insert(url.to_string());
        }
        links
            .into_iter()
            .filter(|link| filter.in_scope(link))
            .filter(|link| self.enqueue(link.clone()))
            .count()
    }

    /// Drop the claim on a URL whose fetch failed or was aborted.
    /// Its budget is freed and it is never handed out again.
    pub fn release(&mut self, url: &str) {
        if self.in_flight.remove(url) {
            self.failed.insert(url.to_string());
        }
    }

    /// Whether the visited set has reached the page budget
    pub fn budget_spent(&self) -> bool {
        self.visited.len() >= self.max_pages
    }

    /// Whether the URL has been visited
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of visited URLs
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs waiting in the queue
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }
}
