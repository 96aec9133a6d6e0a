//! The starter set of sports written into an empty store.

use crate::sport::NewSport;

const STARTER_SPORTS: &[(&str, &str, &str)] = &[
  ("Football", "Eleven-a-side association football", "Team"),
  ("Basketball", "Indoor five-a-side basketball", "Team"),
  ("Tennis", "Singles and doubles on hard courts", "Racket"),
  ("Swimming", "Lane swimming and technique coaching", "Aquatic"),
  ("Volleyball", "Indoor and beach volleyball", "Team"),
  ("Athletics", "Track and field events", "Individual"),
];

/// The starter sports, in a fixed order.
pub fn starter_sports() -> Vec<NewSport> {
  STARTER_SPORTS
    .iter()
    .map(|(name, description, category)| {
      NewSport::new(*name, *description, *category)
    })
    .collect()
}
