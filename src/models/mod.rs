pub mod templater_options;
