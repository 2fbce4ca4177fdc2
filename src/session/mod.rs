pub(crate) mod wizard;
