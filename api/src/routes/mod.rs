pub mod answer;
pub mod convert_json_route;
pub mod debug;
pub mod home_route;
pub mod sum_data_values_route;
