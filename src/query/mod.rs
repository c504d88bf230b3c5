//! Query module - Read-only analyses over loaded OEWS tables

mod crosswalk;
mod geography;
mod industry;
mod occupations;

pub use crosswalk::{Crosswalk, CROSSWALK_GROUPS};
pub use geography::{
    employment_concentration_for_occ, filter_level, top_geographies_for_occ, GeoLevel,
    GeographyConcentration, GeographyWage, UnknownLevelError,
};
pub use industry::{industry_mix_for_occ, IndustryShare};
pub use occupations::{
    listed_rows, occupation_list_az, snapshot_for_occ, snapshot_from_row, top_occupations_by_employment,
    top_occupations_by_median_wage, top_occupations_by_p90_wage, us_median_wage,
    wage_distribution_for_occ, OccupationListing, OccupationSnapshot, OccupationSummary,
    WagePoint, WageRanking,
};
