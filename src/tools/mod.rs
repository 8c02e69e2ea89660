pub mod query_perplexity;
