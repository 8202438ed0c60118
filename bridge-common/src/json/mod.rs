//! JSON formats that need more than derived (de)serialization

pub mod demographic_assessment;

pub use demographic_assessment::DemographicUserAssessment;
