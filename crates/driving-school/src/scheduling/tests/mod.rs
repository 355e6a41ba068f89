mod calendar;
mod common;
mod editor;
mod routing;
