mod advice_scenarios;
mod register_scenarios;
