mod geocode_tests;
mod properties_tests;
mod region_tests;
mod sync_tests;
