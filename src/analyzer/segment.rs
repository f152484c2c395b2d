use std::fmt;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Hibernating,
    AtRisk,
    CannotLoseThem,
    AboutToSleep,
    NeedAttention,
    LoyalCustomers,
    Promising,
    NewCustomers,
    PotentialLoyalists,
    Champions,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Hibernating => "Hibernating",
            Segment::AtRisk => "At Risk",
            Segment::CannotLoseThem => "Cannot Lose Them",
            Segment::AboutToSleep => "About to Sleep",
            Segment::NeedAttention => "Need Attention",
            Segment::LoyalCustomers => "Loyal Customers",
            Segment::Promising => "Promising",
            Segment::NewCustomers => "New Customers",
            Segment::PotentialLoyalists => "Potential Loyalists",
            Segment::Champions => "Champions",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the segment table: an R-score range and an F-score range.
pub struct SegmentRule {
    pub recency: RangeInclusive<u8>,
    pub frequency: RangeInclusive<u8>,
    pub segment: Segment,
}

impl SegmentRule {
    const fn new(
        recency: RangeInclusive<u8>,
        frequency: RangeInclusive<u8>,
        segment: Segment,
    ) -> Self {
        Self {
            recency,
            frequency,
            segment,
        }
    }

    pub fn matches(&self, r_score: u8, f_score: u8) -> bool {
        self.recency.contains(&r_score) && self.frequency.contains(&f_score)
    }
}

/// Evaluated top to bottom; the first matching row wins, so the order matters
/// where ranges overlap.
pub static SEGMENT_RULES: [SegmentRule; 10] = [
    SegmentRule::new(1..=2, 1..=2, Segment::Hibernating),
    SegmentRule::new(1..=2, 3..=4, Segment::AtRisk),
    SegmentRule::new(1..=2, 5..=5, Segment::CannotLoseThem),
    SegmentRule::new(3..=3, 1..=2, Segment::AboutToSleep),
    SegmentRule::new(3..=3, 3..=3, Segment::NeedAttention),
    SegmentRule::new(3..=4, 4..=5, Segment::LoyalCustomers),
    SegmentRule::new(4..=4, 1..=1, Segment::Promising),
    SegmentRule::new(5..=5, 1..=1, Segment::NewCustomers),
    SegmentRule::new(4..=5, 2..=3, Segment::PotentialLoyalists),
    SegmentRule::new(5..=5, 4..=5, Segment::Champions),
];

pub fn classify(r_score: u8, f_score: u8) -> Option<Segment> {
    SEGMENT_RULES
        .iter()
        .find(|rule| rule.matches(r_score, f_score))
        .map(|rule| rule.segment)
}

/// Segment name for the pair, or the raw two-digit code when no rule matches.
pub fn segment_label(r_score: u8, f_score: u8) -> String {
    match classify(r_score, f_score) {
        Some(segment) => segment.as_str().to_string(),
        None => format!("{}{}", r_score, f_score),
    }
}
