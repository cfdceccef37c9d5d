mod build;
mod interaction;
mod transform;
mod view;

pub(in crate::app) use transform::ViewTransform;
