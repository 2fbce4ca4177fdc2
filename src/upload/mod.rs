pub(crate) mod selection;
