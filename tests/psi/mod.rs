mod tests_concurrency;
mod tests_mutation;
mod tests_promotion;
