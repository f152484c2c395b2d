// Synthetic customers and orders
use crate::model::{Customer, GenerationError, MarketingChannel, Order};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::IndexedRandom;
use uuid::{Builder, Uuid};

pub const NUM_CUSTOMERS: usize = 5000;
pub const NUM_ORDERS: usize = 50000;

const FIRST_CUSTOMER_ID: i64 = 1000;
const SIGNUP_WINDOW_DAYS: i64 = 730;
const MIN_ORDER_VALUE: f64 = 20.0;
const MAX_ORDER_VALUE: f64 = 500.0;
const COUPON_PROBABILITY: f64 = 0.25;

/// Channel mix, in the order of `MarketingChannel::ALL`.
const CHANNEL_WEIGHTS: [f64; 4] = [0.3, 0.4, 0.2, 0.1];

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Daniel", "Lisa", "Matthew", "Nancy", "Anthony", "Sandra", "Mark", "Ashley",
    "Paul", "Emily", "Steven", "Donna", "Andrew", "Michelle", "Kevin", "Carol",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "mail.test"];

/// Produces `num_customers` customers and `num_orders` orders, all dated no later than `now`.
pub struct DataGenerator {
    pub num_customers: usize,
    pub num_orders: usize,
    pub now: DateTime<Utc>,
    channels: WeightedIndex<f64>,
}

impl DataGenerator {
    pub fn new(now: DateTime<Utc>) -> Result<Self, GenerationError> {
        Ok(Self {
            num_customers: NUM_CUSTOMERS,
            num_orders: NUM_ORDERS,
            now,
            channels: WeightedIndex::new(CHANNEL_WEIGHTS)?,
        })
    }

    pub fn with_counts(mut self, num_customers: usize, num_orders: usize) -> Self {
        self.num_customers = num_customers;
        self.num_orders = num_orders;
        self
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> (Vec<Customer>, Vec<Order>) {
        let customers = self.generate_customers(rng);
        let orders = self.generate_orders(&customers, rng);
        (customers, orders)
    }

    pub fn generate_customers<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Customer> {
        let window_start = self.now - Duration::days(SIGNUP_WINDOW_DAYS);

        (0..self.num_customers)
            .map(|i| {
                let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
                let last = LAST_NAMES.choose(rng).copied().unwrap_or("Doe");
                let domain = EMAIL_DOMAINS.choose(rng).copied().unwrap_or("example.com");
                let tag: u32 = rng.random_range(1..1000);

                Customer {
                    customer_id: FIRST_CUSTOMER_ID + i as i64,
                    name: format!("{} {}", first, last),
                    email: format!("{}.{}{}@{}", first, last, tag, domain).to_lowercase(),
                    signup_date: random_between(rng, window_start, self.now),
                    marketing_channel: MarketingChannel::ALL[self.channels.sample(rng)],
                }
            })
            .collect()
    }

    /// Each order belongs to a uniformly chosen customer and is dated between
    /// that customer's signup and `now`.
    pub fn generate_orders<R: Rng + ?Sized>(
        &self,
        customers: &[Customer],
        rng: &mut R,
    ) -> Vec<Order> {
        if customers.is_empty() {
            return Vec::new();
        }

        (0..self.num_orders)
            .map(|_| {
                let customer = &customers[rng.random_range(0..customers.len())];
                let value = rng.random_range(MIN_ORDER_VALUE..=MAX_ORDER_VALUE);

                Order {
                    order_id: random_uuid(rng),
                    customer_id: customer.customer_id,
                    order_date: random_between(rng, customer.signup_date, self.now),
                    order_value: round_cents(value),
                    coupon_used: rng.random_bool(COUPON_PROBABILITY),
                }
            })
            .collect()
    }
}

fn random_between<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DateTime<Utc> {
    let span = (end - start).num_seconds();
    if span <= 0 {
        return start;
    }
    start + Duration::seconds(rng.random_range(0..=span))
}

fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes[..]);
    Builder::from_random_bytes(bytes).into_uuid()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
