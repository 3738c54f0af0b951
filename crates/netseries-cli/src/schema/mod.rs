pub mod figure_config;
